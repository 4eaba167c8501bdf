use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paths::AppPaths;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSettings {
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    #[serde(default = "default_backup_folders")]
    pub backup_folders: Vec<String>,

    #[serde(default = "default_backup_dir_name")]
    pub backup_dir_name: String,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_backup_folders() -> Vec<String> {
    ["node_modules", "platforms", "hooks"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_backup_dir_name() -> String {
    ".update_backup".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            backup_folders: default_backup_folders(),
            backup_dir_name: default_backup_dir_name(),
            http_timeout_secs: default_http_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl UpdateSettings {
    /// Load settings from the application config dir, falling back to the
    /// defaults when the file is missing or unreadable.
    #[must_use]
    pub fn load() -> Self {
        let Ok(paths) = AppPaths::new() else {
            return Self::default();
        };
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Self::default();
        }

        Self::load_from(&settings_path).unwrap_or_else(|error| {
            log::warn!("Ignoring settings at {}: {error}", settings_path.display());
            Self::default()
        })
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// # Errors
    /// Returns an error if the config dir cannot be resolved or written.
    pub fn save(&self) -> Result<(), SettingsError> {
        let paths = AppPaths::new().map_err(std::io::Error::other)?;
        paths.ensure_dirs()?;
        self.save_to(&paths.settings_file())
    }

    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    #[must_use]
    pub fn backup_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.backup_dir_name)
    }

    #[must_use]
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}
