//! # Nutristat Core
//!
//! Error and result types shared by every nutristat crate.
//! Each layer converts its own error enum into [`NutristatError`] at the
//! boundary so the HTTP layer has a single mapping to status codes.

pub mod error;
pub mod result;

pub use error::*;
pub use result::*;
