//! Server startup utilities.

use nutristat_config::AppConfig;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
                _        _     _        _
  _ __  _   _| |_ _ __(_)___| |_ __ _| |_
 | '_ \| | | | __| '__| / __| __/ _` | __|
 | | | | |_| | |_| |  | \__ \ || (_| | |_
 |_| |_|\__,_|\__|_|  |_|___/\__\__,_|\__|

                 job-based statistics server
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig, workers: usize) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("REST API:  http://{}/api", addr);
    info!("Health:    http://{}/health", addr);
    info!("Routes:    http://{}/index", addr);
    info!("Dataset:   {}", config.dataset.csv_path);
    info!("Results:   {}", config.jobs.results_dir);
    info!("Workers:   {}", workers);
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_banner_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_banner();
    }

    #[test]
    fn test_print_startup_info_does_not_panic() {
        let _ = tracing_subscriber::fmt::try_init();
        print_startup_info(&AppConfig::default(), 4);
    }
}
