//! Nutristat Data - survey dataset and the statistics served over it.
//!
//! Loads the "Nutrition, Physical Activity, and Obesity" CSV once at startup
//! and exposes nine aggregations, each of which can be bound into a job task.

pub mod aggregation;
pub mod error;
pub mod ingestor;
pub mod questions;
pub mod tuple_key;

pub use aggregation::Aggregation;
pub use error::{DataError, DataResult};
pub use ingestor::{number, DataIngestor, Record, TOP_N};
pub use questions::{Direction, QUESTIONS_BEST_IS_MAX, QUESTIONS_BEST_IS_MIN};
pub use tuple_key::tuple_key;
