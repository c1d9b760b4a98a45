//! Default demo application.
//!
//! Exposes `/health` and serves the `static/` directory for everything
//! else. The search API proper is mounted by whoever owns it; this router
//! is what the demo serves when nothing else is supplied.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::lifecycle::startup::BootReport;

/// State shared with the handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub storage_ready: bool,
    pub degraded: Vec<String>,
    pub artifacts: Vec<String>,
    pub started: Instant,
}

impl AppState {
    pub fn from_report(report: &BootReport) -> Self {
        Self {
            storage_ready: report.storage.is_ready(),
            degraded: report.degraded.clone(),
            artifacts: report
                .artifacts
                .iter()
                .filter_map(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
            started: Instant::now(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub degraded: Vec<String>,
    pub artifacts: Vec<String>,
    pub uptime_secs: u64,
}

/// Build the demo router.
pub fn demo_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(Arc::new(state))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.degraded.is_empty() { "ok" } else { "degraded" };
    let storage = if state.storage_ready { "ready" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        storage: storage.to_string(),
        degraded: state.degraded.clone(),
        artifacts: state.artifacts.clone(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}
