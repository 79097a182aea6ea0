//! Configuration loading from file system
//!
//! Keymap files are plain JSON matching [`Config`].

use std::fs;
use std::path::Path;

use tracing::{info, instrument, warn};

use super::types::Config;
use crate::error::{Result, ShortcutError};

/// Load a keymap file, falling back to `Config::default()` on any failure.
///
/// A missing file is expected (info); an unreadable or malformed one is
/// reported as a warning.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    match try_load_config(path) {
        Ok(config) => {
            info!(
                scopes = config.scopes.len(),
                shortcuts = config.shortcut_count(),
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

/// Load a keymap file, surfacing read and parse errors.
pub fn try_load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|source| ShortcutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ShortcutError::Config {
        path: path.to_path_buf(),
        source,
    })
}
