//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Provisioned options → Dependencies → Directories → Storage
//!     → Artifacts → Ready::serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Trigger broadcast → Server drains → Exit 0
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup, no concurrency between gates
//! - Serving starts last (traffic only once artifacts are verified)
//! - Draining is bounded by a grace period

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{shutdown_on_stop, wait_for_stop, StopSignal};
pub use startup::{BootReport, BootSequence, BootState, Ready};
