//! Application state for Axum handlers.

use nutristat_data::DataIngestor;
use nutristat_jobs::JobEngine;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<JobEngine>,
    pub ingestor: Arc<DataIngestor>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(engine: Arc<JobEngine>, ingestor: Arc<DataIngestor>) -> Self {
        Self { engine, ingestor }
    }
}
