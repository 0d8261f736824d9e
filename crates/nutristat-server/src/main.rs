//! # Nutristat Server
//!
//! Main entry point: loads configuration, installs logging, loads the
//! dataset, starts the worker pool and serves the REST API until a
//! termination signal arrives.

use nutristat_config::ConfigLoader;
use nutristat_core::NutristatResult;
use nutristat_server::{init_logging, startup, Application};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("nutristat-server: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> NutristatResult<()> {
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;

    let _log_guard = init_logging(&config.logging)?;

    startup::print_banner();
    info!("Starting nutristat server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    let app = Application::build(config)?;
    startup::print_startup_info(app.config(), app.engine().pool_size());

    app.run().await
}
