//! Enhanced CADENCE demo bootstrap.
//!
//! Prepares the runtime environment for the personalized search demo and
//! hands control to the HTTP service once every precondition holds.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file (optional)
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────┐   ┌─────────────┐   ┌─────────┐   ┌───────────┐   ┌────────┐
//!   │ options  │──▶│ dependencies │──▶│ directories │──▶│ storage │──▶│ artifacts │──▶│ serve  │
//!   │ (frozen) │   │ req: abort   │   │ idempotent  │   │ soft    │   │ hard      │   │ ctrl+c │
//!   └──────────┘   │ opt: degrade │   └─────────────┘   └─────────┘   └───────────┘   └────────┘
//!                  └──────────────┘
//! ```

// Core subsystems
pub mod bootstrap;
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod console;
pub mod lifecycle;
pub mod observability;

pub use bootstrap::BootstrapError;
pub use config::{ConfigurationSet, DemoConfig};
pub use http::{AxumHost, ServeConfig, ServiceHost};
pub use lifecycle::{BootSequence, Ready, Shutdown};
