//! Application assembly and lifecycle.

use axum::Router;
use nutristat_config::AppConfig;
use nutristat_core::{NutristatError, NutristatResult};
use nutristat_data::DataIngestor;
use nutristat_jobs::{register_metrics, EngineConfig, JobEngine, ShutdownReport};
use nutristat_rest::{create_router, AppState};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// A fully wired server: dataset loaded, worker pool running.
pub struct Application {
    config: AppConfig,
    engine: Arc<JobEngine>,
    ingestor: Arc<DataIngestor>,
}

impl Application {
    /// Loads the dataset and starts the job engine.
    ///
    /// A missing or unreadable dataset is a startup error.
    pub fn build(config: AppConfig) -> NutristatResult<Self> {
        register_metrics();

        let ingestor = DataIngestor::from_path(&config.dataset.csv_path)?;
        let engine = JobEngine::start(EngineConfig::from(&config.jobs))?;

        Ok(Self::from_parts(config, engine, ingestor))
    }

    /// Assembles an application from already constructed components.
    pub fn from_parts(config: AppConfig, engine: JobEngine, ingestor: DataIngestor) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            ingestor: Arc::new(ingestor),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<JobEngine> {
        &self.engine
    }

    /// Builds the HTTP router over the shared engine and dataset.
    pub fn router(&self) -> Router {
        let state = AppState::new(Arc::clone(&self.engine), Arc::clone(&self.ingestor));
        create_router(state, &self.config.server)
    }

    /// Binds the configured address.
    pub async fn bind(&self) -> NutristatResult<TcpListener> {
        let addr = self.config.server.addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| NutristatError::Internal(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Serves until SIGINT or SIGTERM, then stops the worker pool.
    pub async fn run(self) -> NutristatResult<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown_signal()).await.map(|_| ())
    }

    /// Serves on `listener` until `shutdown` resolves, then stops the worker pool.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> NutristatResult<ShutdownReport>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("Starting REST server on http://{}", addr);
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| NutristatError::Internal(format!("REST server error: {}", e)))?;

        let engine = Arc::clone(&self.engine);
        let report = tokio::task::spawn_blocking(move || engine.initiate_shutdown())
            .await
            .map_err(|e| NutristatError::Internal(format!("Worker pool shutdown failed: {}", e)))?;

        info!(
            workers_joined = report.workers_joined,
            workers_panicked = report.workers_panicked,
            jobs_abandoned = report.jobs_abandoned,
            "Server shutdown complete"
        );
        Ok(report)
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
