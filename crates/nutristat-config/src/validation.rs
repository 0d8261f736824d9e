//! Configuration validation module.
//!
//! Checks every section up front so a bad value fails at startup instead of
//! when the first request arrives.

use crate::AppConfig;
use std::fmt;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Worker thread override must be at least one.
    InvalidThreadCount { value: usize },
    /// A required path is empty.
    EmptyPath { name: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout {} must be positive, got {}", name, value)
            }
            Self::InvalidThreadCount { value } => {
                write!(f, "Worker thread count must be at least 1, got {}", value)
            }
            Self::EmptyPath { name } => write!(f, "Path {} cannot be empty", name),
            Self::InvalidLogLevel { value } => write!(
                f,
                "Invalid log level: {} (must be trace, debug, info, warn, or error)",
                value
            ),
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: {} (must be json or pretty)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Result of configuration validation containing all errors found.
#[derive(Debug)]
pub struct ValidationResult {
    errors: Vec<ConfigValidationError>,
}

impl ValidationResult {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the validation errors.
    pub fn errors(&self) -> &[ConfigValidationError] {
        &self.errors
    }

    /// Converts to Result, returning Err with all errors if any exist.
    pub fn into_result(self) -> Result<(), Vec<ConfigValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    const VALID_LOG_FORMATS: &'static [&'static str] = &["json", "pretty"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut result = ValidationResult::new();

        Self::validate_server(&config.server, &mut result);
        Self::validate_dataset(&config.dataset, &mut result);
        Self::validate_jobs(&config.jobs, &mut result);
        Self::validate_logging(&config.logging, &mut result);

        result.into_result()
    }

    fn validate_server(config: &crate::ServerConfig, result: &mut ValidationResult) {
        if config.port == 0 {
            result.add_error(ConfigValidationError::InvalidPort {
                name: "port".to_string(),
                value: config.port,
            });
        }

        if config.request_timeout_secs == 0 {
            result.add_error(ConfigValidationError::NonPositiveTimeout {
                name: "request_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_dataset(config: &crate::DatasetConfig, result: &mut ValidationResult) {
        if config.csv_path.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyPath {
                name: "dataset.csv_path".to_string(),
            });
        }
    }

    fn validate_jobs(config: &crate::JobsConfig, result: &mut ValidationResult) {
        if config.num_threads == Some(0) {
            result.add_error(ConfigValidationError::InvalidThreadCount { value: 0 });
        }

        if config.results_dir.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyPath {
                name: "jobs.results_dir".to_string(),
            });
        }
    }

    fn validate_logging(config: &crate::LoggingConfig, result: &mut ValidationResult) {
        let level = config.level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogLevel {
                value: config.level.clone(),
            });
        }

        let format = config.format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogFormat {
                value: config.format.clone(),
            });
        }

        if config.file_name.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyPath {
                name: "logging.file_name".to_string(),
            });
        }
    }
}

/// Formats validation errors for display.
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigValidationError::InvalidPort { name, .. } if name == "port"
        )));
    }

    #[test]
    fn test_zero_thread_override_rejected() {
        let mut config = AppConfig::default();
        config.jobs.num_threads = Some(0);

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::InvalidThreadCount { value: 0 }]
        );
    }

    #[test]
    fn test_empty_paths_rejected() {
        let mut config = AppConfig::default();
        config.dataset.csv_path = "  ".to_string();
        config.jobs.results_dir = String::new();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_invalid_log_settings() {
        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        config.logging.format = "xml".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidLogLevel { .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigValidationError::InvalidLogFormat { .. })));
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = AppConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_format_validation_errors() {
        let errors = vec![
            ConfigValidationError::InvalidPort {
                name: "port".to_string(),
                value: 0,
            },
            ConfigValidationError::InvalidThreadCount { value: 0 },
        ];
        let output = format_validation_errors(&errors);
        assert!(output.contains("1. Invalid port"));
        assert!(output.contains("2. Worker thread count"));
    }
}
