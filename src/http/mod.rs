//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! ServeConfig (from the option table)
//!     → server.rs (bind, middleware, graceful shutdown)
//!     → request.rs (x-request-id on every request)
//!     → app.rs (default demo router: /health + static files)
//! ```
//!
//! # Design Decisions
//! - Serving goes through `ServiceHost` so the launcher can be tested
//!   without sockets
//! - Access logging is tower-http's trace layer

pub mod app;
pub mod request;
pub mod server;

pub use app::{demo_router, AppState, HealthResponse};
pub use request::{RequestIdMaker, X_REQUEST_ID};
pub use server::{AxumHost, ServeConfig, ServeError, ServiceHost};
