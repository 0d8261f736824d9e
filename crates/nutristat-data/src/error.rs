//! Dataset error types.

use nutristat_core::NutristatError;
use nutristat_jobs::JobError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for dataset operations.
pub type DataResult<T> = Result<T, DataError>;

/// Dataset errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// The CSV file does not exist.
    #[error("Dataset file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The CSV file could not be read.
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV content is malformed.
    #[error("Failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),

    /// The question does not occur in the dataset.
    #[error("Invalid question: {0}")]
    UnknownQuestion(String),

    /// A state-scoped operation was called without a state.
    #[error("Missing required field: {0}")]
    MissingArgument(&'static str),

    /// No operation has this name.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

impl From<DataError> for JobError {
    fn from(err: DataError) -> Self {
        JobError::ExecutionFailed(err.to_string())
    }
}

impl From<DataError> for NutristatError {
    fn from(err: DataError) -> Self {
        let message = err.to_string();
        match err {
            DataError::UnknownQuestion(_) | DataError::MissingArgument(_) => {
                NutristatError::validation(message)
            }
            DataError::UnknownOperation(name) => NutristatError::not_found("Operation", name),
            DataError::FileNotFound(_) | DataError::Io(_) | DataError::Csv(_) => {
                NutristatError::Dataset(message)
            }
        }
    }
}
