// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading configuration
//! from files and applying command-line overrides.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "snaptrack.toml";

/// Storage directory used when neither the file nor the caller sets one.
pub const DEFAULT_STORAGE_DIR: &str = "snapshots";

/// Load configuration from a TOML file.
///
/// A missing file yields defaults; a file that exists but does not parse
/// is an error, so typos are not silently ignored.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::debug!("No config file at {:?}, using defaults", path);
        return Ok(Config::default());
    }
    Config::load(path).map_err(|e| AppError::config(format!("Failed to load {path:?}: {e}")))
}

/// Load configuration, apply a storage directory override, and validate.
///
/// The storage directory falls back to [`DEFAULT_STORAGE_DIR`] so the CLI
/// always persists.
pub fn load_all(path: &Path, storage_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = load_config(path)?;

    if let Some(dir) = storage_dir {
        config.tracker.storage_dir = Some(dir);
    }
    if config.tracker.storage_dir.is_none() {
        config.tracker.storage_dir = Some(PathBuf::from(DEFAULT_STORAGE_DIR));
    }

    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    Ok(config)
}
