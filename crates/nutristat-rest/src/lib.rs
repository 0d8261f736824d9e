//! # Nutristat REST
//!
//! REST API layer using Axum. Statistics requests are turned into jobs on the
//! engine; clients poll `/api/get_results/:job_id` for the outcome.

pub mod controllers;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
