//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gates, launcher and HTTP layers produce:
//!     → logging.rs (structured log events, stdout)
//!     → tower-http trace layer (access log, one span per request)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted strings where possible
//! - Request ID flows from the request header into the response

pub mod logging;
