//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use nutristat_core::NutristatError;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Legacy worker-count override honoured on top of every other source.
pub const THREAD_COUNT_ENV: &str = "TP_NUM_OF_THREADS";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local, uncommitted overrides
    /// 4. Environment variables such as `NUTRISTAT__JOBS__NUM_THREADS`
    /// 5. `TP_NUM_OF_THREADS` for the worker count
    pub fn new(config_dir: impl Into<String>) -> Result<Self, NutristatError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, NutristatError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    ///
    /// The worker pool size is fixed once the engine starts, so a reload only
    /// affects components that read the configuration again.
    pub async fn reload(&self) -> Result<(), NutristatError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, NutristatError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("NUTRISTAT_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("NUTRISTAT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_nutristat_error)?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_nutristat_error)?;

        apply_thread_override(
            &mut app_config,
            std::env::var(THREAD_COUNT_ENV).ok().as_deref(),
        );

        ConfigValidator::validate(&app_config)
            .map_err(|errors| NutristatError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }

    /// Gets a specific configuration value by key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

/// Applies a raw `TP_NUM_OF_THREADS` value to the jobs section.
///
/// Unparseable values are ignored with a warning and the configured value is kept.
pub fn apply_thread_override(config: &mut AppConfig, raw: Option<&str>) {
    let Some(raw) = raw else {
        return;
    };

    match raw.trim().parse::<usize>() {
        Ok(threads) => {
            debug!(threads, "Applying {} override", THREAD_COUNT_ENV);
            config.jobs.num_threads = Some(threads);
        }
        Err(e) => {
            warn!(value = raw, error = %e, "Ignoring invalid {}", THREAD_COUNT_ENV);
        }
    }
}

fn config_error_to_nutristat_error(err: ConfigError) -> NutristatError {
    NutristatError::Configuration(err.to_string())
}
