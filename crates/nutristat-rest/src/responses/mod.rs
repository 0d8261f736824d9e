//! API response types.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nutristat_core::{ErrorResponse, NutristatError};
use nutristat_data::DataError;
use nutristat_jobs::{JobError, JobId, JobStatus};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

/// Reason reported for unknown job identifiers.
pub const INVALID_JOB_ID: &str = "Invalid job_id";

/// Body of a completed listing or count: `{"status": "done", "data": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct DoneResponse<T> {
    pub status: JobStatus,
    pub data: T,
}

impl<T> DoneResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: JobStatus::Done,
            data,
        }
    }
}

/// Body returned when a job is accepted.
#[derive(Debug, Clone, Serialize)]
pub struct JobCreated {
    pub job_id: JobId,
}

/// Body of a result query, tagged by job status.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobResultResponse {
    Running,
    Done { data: Value },
    Failed { reason: String },
}

/// Job entry in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub reason: String,
    pub code: String,
}

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub NutristatError);

impl AppError {
    /// Error for a job ID that was never issued.
    pub fn invalid_job_id(id: &JobId) -> Self {
        Self(NutristatError::not_found("Job", id))
    }
}

impl From<NutristatError> for AppError {
    fn from(err: NutristatError) -> Self {
        Self(err)
    }
}

impl From<JobError> for AppError {
    fn from(err: JobError) -> Self {
        Self(err.into())
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self(NutristatError::validation(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }

        let detail = ErrorResponse::from_error(&self.0);
        let reason = match &self.0 {
            NutristatError::NotFound {
                resource_type: "Job",
                ..
            } => INVALID_JOB_ID.to_string(),
            _ => detail.message,
        };

        let body = ErrorBody {
            status: "error",
            reason,
            code: detail.code,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Helper to create a success response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}
