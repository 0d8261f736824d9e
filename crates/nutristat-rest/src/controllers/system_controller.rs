//! Administrative and utility endpoints.

use crate::responses::{ok, ApiResult, AppError};
use crate::router::defined_routes;
use crate::state::AppState;
use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use nutristat_core::NutristatError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Body returned once the worker pool has stopped.
#[derive(Debug, Clone, Serialize)]
pub struct ShutdownResponse {
    pub message: &'static str,
}

/// Body returned by the echo endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EchoResponse {
    pub message: &'static str,
    pub data: Value,
}

/// Creates the `/api` administrative router.
pub fn router() -> Router<AppState> {
    Router::new().route("/post_endpoint", post(post_endpoint))
}

/// Creates the shutdown router.
///
/// Shutdown waits for running jobs, so it is served without a request timeout.
pub fn shutdown_router() -> Router<AppState> {
    Router::new().route("/api/graceful_shutdown", get(graceful_shutdown))
}

/// Creates the router for the route listing pages.
pub fn index_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/index", get(index))
}

/// Stops the worker pool and waits for every worker to exit.
pub async fn graceful_shutdown(State(state): State<AppState>) -> ApiResult<ShutdownResponse> {
    info!("Graceful shutdown requested");

    let engine = Arc::clone(&state.engine);
    let report = tokio::task::spawn_blocking(move || engine.initiate_shutdown())
        .await
        .map_err(|e| AppError(NutristatError::internal(format!("Shutdown failed: {}", e))))?;

    info!(
        initiated = report.initiated,
        workers_joined = report.workers_joined,
        jobs_abandoned = report.jobs_abandoned,
        "Worker pool stopped"
    );

    ok(ShutdownResponse {
        message: "Shutdown complete.",
    })
}

/// Echoes the request body back.
pub async fn post_endpoint(Json(data): Json<Value>) -> ApiResult<EchoResponse> {
    info!(data = %data, "Got data in post");
    ok(EchoResponse {
        message: "Received data successfully",
        data,
    })
}

/// Lists the defined routes.
pub async fn index() -> Html<String> {
    let mut page = String::from(
        "Hello, World!\n Interact with the webserver using one of the defined routes:\n",
    );
    for route in defined_routes() {
        page.push_str(&format!(
            "<p>Endpoint: \"{}\" Methods: \"{}\"</p>",
            route.path, route.method
        ));
    }
    Html(page)
}
