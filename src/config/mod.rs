//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (workspace, server, probe, option overrides)
//!     → environment.rs (defaults + overrides)
//!     → ConfigurationSet (frozen, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - The option table is built once and never mutated
//! - Nothing reads or writes process environment variables
//! - Validation separates syntactic (serde) from semantic checks

pub mod environment;
pub mod loader;
pub mod schema;
pub mod validation;

pub use environment::{ConfigurationSet, OptionKind, OptionSpec, OPTIONS};
pub use loader::{load_config, ConfigError};
pub use schema::{DemoConfig, ProbeConfig, ServerConfig, WorkspaceConfig};
