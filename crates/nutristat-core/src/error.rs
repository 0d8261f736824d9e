//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for nutristat.
///
/// Crate-local errors (jobs, dataset, configuration) are folded into this
/// enum before they cross the HTTP boundary.
#[derive(Error, Debug)]
pub enum NutristatError {
    // ============ Request Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate identifier)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Availability Errors ============
    /// The service no longer accepts work
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    // ============ Infrastructure Errors ============
    /// Dataset could not be loaded or queried
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Result storage error
    #[error("Storage error: {0}")]
    Storage(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NutristatError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::ServiceUnavailable(_) => 503,
            Self::Dataset(_)
            | Self::Configuration(_)
            | Self::Storage(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Dataset(_) => "DATASET_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a service unavailable error.
    #[must_use]
    pub fn unavailable<T: Into<String>>(message: T) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for NutristatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for NutristatError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `NutristatError`.
    #[must_use]
    pub fn from_error(error: &NutristatError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&NutristatError> for ErrorResponse {
    fn from(error: &NutristatError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(NutristatError::not_found("Job", "job_id1").status_code(), 404);
        assert_eq!(NutristatError::validation("missing state").status_code(), 400);
        assert_eq!(NutristatError::conflict("duplicate").status_code(), 409);
        assert_eq!(NutristatError::unavailable("shutting down").status_code(), 503);
        assert_eq!(NutristatError::Dataset("bad csv".to_string()).status_code(), 500);
        assert_eq!(NutristatError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(NutristatError::not_found("Job", 1).error_code(), "NOT_FOUND");
        assert_eq!(NutristatError::validation("bad").error_code(), "VALIDATION_ERROR");
        assert_eq!(
            NutristatError::unavailable("down").error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(
            NutristatError::Storage("disk full".to_string()).error_code(),
            "STORAGE_ERROR"
        );
        assert_eq!(NutristatError::internal("err").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_constructors() {
        let not_found = NutristatError::not_found("Job", "job_id7");
        assert!(not_found.to_string().contains("job_id7"));

        let validation = NutristatError::validation("invalid field");
        assert!(validation.to_string().contains("invalid field"));

        let unavailable = NutristatError::unavailable("pool is shutting down");
        assert!(unavailable.to_string().contains("shutting down"));
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = NutristatError::from(io);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_error_response_from_error() {
        let err = NutristatError::not_found("Job", 1);
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.code, "NOT_FOUND");
        assert!(!response.message.is_empty());
    }

    #[test]
    fn test_error_response_from_ref() {
        let err = NutristatError::conflict("job_id3 already registered");
        let response: ErrorResponse = ErrorResponse::from(&err);
        assert_eq!(response.code, "CONFLICT");
    }
}
