//! Result type aliases for nutristat.

use crate::NutristatError;

/// A specialized `Result` type for nutristat operations.
pub type NutristatResult<T> = Result<T, NutristatError>;
