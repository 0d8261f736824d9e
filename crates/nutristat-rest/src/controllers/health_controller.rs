//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use nutristat_jobs::ShutdownPhase;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Application version.
    pub version: String,
    /// Whether new jobs are accepted.
    pub accepting_jobs: bool,
    /// Worker pool phase.
    pub phase: ShutdownPhase,
    /// Number of worker threads.
    pub workers: usize,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/live", get(liveness_check))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let accepting = state.engine.is_accepting();
    Json(HealthResponse {
        status: if accepting { "healthy" } else { "draining" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        accepting_jobs: accepting,
        phase: state.engine.phase(),
        workers: state.engine.pool_size(),
    })
}

/// Liveness check endpoint.
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
