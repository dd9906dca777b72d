//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot history settings
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Serialize configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        if !defaults::LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(AppError::validation(format!(
                "logging.level '{}' is not one of {:?}",
                self.logging.level,
                defaults::LOG_LEVELS
            )));
        }
        Ok(())
    }
}

/// Per-source history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum snapshots retained per source; the oldest is evicted first
    #[serde(default = "defaults::max_snapshots")]
    pub max_snapshots: usize,

    /// Directory for persisted snapshot records (in-memory only if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl TrackerConfig {
    /// In-memory configuration with the given capacity.
    pub fn with_capacity(max_snapshots: usize) -> Self {
        Self {
            max_snapshots,
            storage_dir: None,
        }
    }

    /// Builder-style storage directory setter.
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_snapshots == 0 {
            return Err(AppError::validation("tracker.max_snapshots must be > 0"));
        }
        if let Some(dir) = &self.storage_dir {
            if dir.as_os_str().is_empty() {
                return Err(AppError::validation("tracker.storage_dir is empty"));
            }
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::with_capacity(defaults::max_snapshots())
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

    pub fn max_snapshots() -> usize {
        10
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracker.max_snapshots, 10);
        assert!(config.tracker.storage_dir.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [tracker]
            storage_dir = "snapshots"
            "#,
        )
        .unwrap();
        assert_eq!(config.tracker.max_snapshots, 10);
        assert_eq!(config.tracker.storage_dir, Some(PathBuf::from("snapshots")));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.tracker.max_snapshots = 0;
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/snaptrack.toml");
        assert_eq!(config.tracker.max_snapshots, 10);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.tracker = TrackerConfig::with_capacity(3).storage_dir("data/snapshots");
        let text = config.to_toml().unwrap();
        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded.tracker.max_snapshots, 3);
        assert_eq!(
            loaded.tracker.storage_dir,
            Some(PathBuf::from("data/snapshots"))
        );
    }
}
