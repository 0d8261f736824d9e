//! Job error types.

use crate::job::JobId;
use nutristat_core::NutristatError;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Job-related errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// A job with this identifier is already registered.
    #[error("Job identifier already registered: {0}")]
    DuplicateIdentifier(JobId),

    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The pool has started shutting down and rejects new work.
    #[error("Worker pool is shutting down")]
    PoolShuttingDown,

    /// Result could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Result could not be written or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The job's function returned an error.
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    /// The job's function panicked.
    #[error("Job panicked: {0}")]
    Panicked(String),

    /// Invalid job state transition.
    #[error("Invalid job state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Worker error.
    #[error("Worker error: {0}")]
    Worker(String),
}

impl JobError {
    /// Returns true if the error rejected a submission outright.
    pub fn is_rejection(&self) -> bool {
        matches!(self, JobError::PoolShuttingDown | JobError::DuplicateIdentifier(_))
    }

    /// Returns true if the error came from writing or reading a result artifact.
    pub fn is_storage(&self) -> bool {
        matches!(self, JobError::Serialization(_) | JobError::Io(_))
    }

    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::DuplicateIdentifier(_) => "duplicate_identifier",
            JobError::NotFound(_) => "not_found",
            JobError::PoolShuttingDown => "pool_shutting_down",
            JobError::Serialization(_) => "serialization",
            JobError::Io(_) => "io",
            JobError::ExecutionFailed(_) => "execution_failed",
            JobError::Panicked(_) => "panicked",
            JobError::InvalidState { .. } => "invalid_state",
            JobError::Worker(_) => "worker",
        }
    }
}

impl From<JobError> for NutristatError {
    fn from(err: JobError) -> Self {
        let message = err.to_string();
        match err {
            JobError::NotFound(id) => NutristatError::not_found("Job", id),
            JobError::DuplicateIdentifier(_) => NutristatError::conflict(message),
            JobError::PoolShuttingDown => NutristatError::unavailable(message),
            JobError::Io(_) | JobError::Serialization(_) => NutristatError::Storage(message),
            _ => NutristatError::internal(message),
        }
    }
}
