//! Tracing subscriber setup.

use nutristat_config::LoggingConfig;
use nutristat_core::{NutristatError, NutristatResult};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Builds the default filter directives for a configured level.
pub fn default_directives(level: &str) -> String {
    format!(
        "{},{},tower_http=debug",
        level.to_lowercase(),
        nutristat_directive(level)
    )
}

fn nutristat_directive(level: &str) -> String {
    // Info and debug both enable debug output for nutristat targets.
    match level.to_lowercase().as_str() {
        "trace" => "nutristat=trace".to_string(),
        "debug" | "info" => "nutristat=debug".to_string(),
        other => format!("nutristat={}", other),
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level. When `logging.directory` is set a
/// daily rolling file is written through a non-blocking writer; the returned
/// guard must be held for as long as logs should be flushed.
pub fn init_logging(config: &LoggingConfig) -> NutristatResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let console = if config.format.eq_ignore_ascii_case("json") {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| NutristatError::Configuration(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}
