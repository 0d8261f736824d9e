//! REST API controllers.

pub mod health_controller;
pub mod jobs_controller;
pub mod stats_controller;
pub mod system_controller;

pub use health_controller::*;
