//! Job engine configuration.

use nutristat_config::JobsConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::thread;

/// Resolved configuration for the job engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of worker threads.
    pub pool_size: usize,

    /// Directory for result artifacts.
    pub results_dir: PathBuf,
}

impl EngineConfig {
    /// Creates a configuration with an explicit pool size (at least 1).
    pub fn new(pool_size: usize, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool_size: pool_size.max(1),
            results_dir: results_dir.into(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&JobsConfig::default())
    }
}

impl From<&JobsConfig> for EngineConfig {
    fn from(config: &JobsConfig) -> Self {
        Self {
            pool_size: resolve_pool_size(config.num_threads, hardware_threads()),
            results_dir: PathBuf::from(&config.results_dir),
        }
    }
}

/// Number of hardware threads, or 1 if it cannot be determined.
pub fn hardware_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Clamps a requested worker count to the hardware thread count.
///
/// An absent request means one worker per hardware thread.
pub fn resolve_pool_size(requested: Option<usize>, hardware: usize) -> usize {
    let hardware = hardware.max(1);
    requested.unwrap_or(hardware).min(hardware).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pool_size() {
        assert_eq!(resolve_pool_size(None, 8), 8);
        assert_eq!(resolve_pool_size(Some(4), 8), 4);
        assert_eq!(resolve_pool_size(Some(32), 8), 8);
        assert_eq!(resolve_pool_size(Some(0), 8), 1);
        assert_eq!(resolve_pool_size(None, 0), 1);
    }

    #[test]
    fn test_from_jobs_config() {
        let jobs = JobsConfig {
            num_threads: Some(1),
            results_dir: "out".to_string(),
        };
        let config = EngineConfig::from(&jobs);
        assert_eq!(config.pool_size, 1);
        assert_eq!(config.results_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_default_uses_hardware_threads() {
        let config = EngineConfig::default();
        assert_eq!(config.pool_size, hardware_threads());
        assert_eq!(config.results_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_explicit_pool_size_floor() {
        assert_eq!(EngineConfig::new(0, "r").pool_size, 1);
    }
}
