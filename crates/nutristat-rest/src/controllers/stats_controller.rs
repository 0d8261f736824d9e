//! Statistics request controller.
//!
//! One POST route per aggregation. Each request becomes a job and the
//! response carries only its ID.

use crate::responses::{ok, ApiResult, AppError, JobCreated};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use nutristat_data::Aggregation;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Body of a statistics request.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsRequest {
    pub question: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Route path for an aggregation, relative to `/api`.
pub fn route_path(aggregation: Aggregation) -> String {
    format!("/{}", aggregation.as_str())
}

/// Creates the statistics router.
pub fn router() -> Router<AppState> {
    Aggregation::ALL
        .into_iter()
        .fold(Router::new(), |router, aggregation| {
            router.route(
                &route_path(aggregation),
                post(
                    move |State(state): State<AppState>,
                          body: Result<Json<StatsRequest>, JsonRejection>| async move {
                        submit(aggregation, state, body)
                    },
                ),
            )
        })
}

/// Turns a request into a job and returns its ID.
fn submit(
    aggregation: Aggregation,
    state: AppState,
    body: Result<Json<StatsRequest>, JsonRejection>,
) -> ApiResult<JobCreated> {
    let Json(request) = body?;
    info!(
        operation = %aggregation,
        question = %request.question,
        state = ?request.state,
        "Got request"
    );

    let task = aggregation.task(Arc::clone(&state.ingestor), request.question, request.state)?;
    let job_id = state.engine.submit(task).map_err(AppError::from)?;

    ok(JobCreated { job_id })
}
