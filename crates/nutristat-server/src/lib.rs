//! # Nutristat Server
//!
//! Wires configuration, logging, the dataset, the job engine and the HTTP
//! router into a runnable server.

pub mod app;
pub mod logging;
pub mod startup;

pub use app::Application;
pub use logging::init_logging;
