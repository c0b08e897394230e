//! Settings persistence
//!
//! Loads and saves [`EngineConfig`] as JSON.
//!
//! # File Location
//!
//! An explicit `--config <path>` wins. Otherwise settings live in
//! `settings.json` under the user's configuration directory, falling back to
//! the current directory when no such directory exists.
//!
//! # Error Handling
//!
//! Loading never stops the program: a missing, unreadable, unparsable or
//! invalid file is logged and the defaults are used. Saving reports errors
//! to the caller.

use super::error::AppResult;
use chopsticks_engine::EngineConfig;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Path of the default settings file
///
/// E.g. `~/.config/chopsticks/settings.json` on Linux.
pub fn default_settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "chopsticks") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        // Fallback to current directory
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Read and validate a settings file
pub fn read_config(path: &Path) -> AppResult<EngineConfig> {
    let contents = fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load settings from `path` (or the default location), using defaults on any failure
pub fn load_config(path: Option<&Path>) -> EngineConfig {
    let settings_path = path.map(Path::to_path_buf).unwrap_or_else(default_settings_path);

    if !settings_path.exists() {
        if path.is_some() {
            warn!("[SETTINGS] No settings file at {:?}. Using defaults.", settings_path);
        } else {
            info!("[SETTINGS] No settings file found at {:?}. Using defaults.", settings_path);
        }
        return EngineConfig::default();
    }

    match read_config(&settings_path) {
        Ok(config) => {
            info!("[SETTINGS] Loaded settings from {:?}", settings_path);
            config
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings at {:?}: {}. Using defaults.",
                settings_path, e
            );
            EngineConfig::default()
        }
    }
}

/// Write settings as pretty JSON, creating the directory if needed
pub fn save_config(config: &EngineConfig, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}
