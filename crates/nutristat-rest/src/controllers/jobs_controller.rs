//! Job status and result controller.

use crate::responses::{ok, ApiResult, AppError, DoneResponse, JobResultResponse, JobSummary};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use nutristat_core::NutristatError;
use nutristat_jobs::{JobId, JobStatus};
use std::sync::Arc;
use tracing::info;

/// Creates the jobs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get_results/:job_id", get(get_results))
        .route("/jobs", get(list_jobs))
        .route("/num_jobs", get(num_jobs))
}

/// Returns a job's status, and its data once done.
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<JobResultResponse> {
    info!(job_id = %job_id, "Result requested");
    let id = JobId::from(job_id);

    let info = state
        .engine
        .job(&id)
        .ok_or_else(|| AppError::invalid_job_id(&id))?;

    let response = match info.status {
        JobStatus::Running => JobResultResponse::Running,
        JobStatus::Failed => JobResultResponse::Failed {
            reason: info.reason.unwrap_or_default(),
        },
        JobStatus::Done => {
            let engine = Arc::clone(&state.engine);
            let data = tokio::task::spawn_blocking(move || engine.load_result(&id))
                .await
                .map_err(|e| NutristatError::internal(format!("Result reader failed: {}", e)))??;
            JobResultResponse::Done { data }
        }
    };

    ok(response)
}

/// Lists every job with its status.
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<DoneResponse<Vec<JobSummary>>> {
    let jobs = state
        .engine
        .list_jobs()
        .into_iter()
        .map(|info| JobSummary {
            job_id: info.job_id,
            status: info.status,
        })
        .collect();

    ok(DoneResponse::new(jobs))
}

/// Returns the number of jobs ever submitted.
pub async fn num_jobs(State(state): State<AppState>) -> ApiResult<DoneResponse<usize>> {
    ok(DoneResponse::new(state.engine.count_jobs()))
}
