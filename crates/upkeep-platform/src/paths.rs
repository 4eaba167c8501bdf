use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "upkeep";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("No per-user config directory on this platform")]
    NoConfigDir,
    #[error("No per-user data directory on this platform")]
    NoDataDir,
}

/// Where upkeep keeps its settings file and debug log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the per-user config and data directories.
    ///
    /// # Errors
    /// Returns an error if the platform reports no such directory.
    pub fn new() -> Result<Self, AppPathsError> {
        let config = dirs::config_dir().ok_or(AppPathsError::NoConfigDir)?;
        let data = dirs::data_dir().ok_or(AppPathsError::NoDataDir)?;
        Ok(Self {
            config_dir: config.join(APP_DIR),
            data_dir: data.join(APP_DIR),
        })
    }

    /// Keep both directories under a single root.
    #[must_use]
    pub fn under(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("upkeep.log")
    }

    /// # Errors
    /// Returns an error if either directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::AppPaths;

    #[test]
    fn under_root_splits_config_and_data() {
        let paths = AppPaths::under(Path::new("/srv/upkeep"));

        assert_eq!(paths.settings_file(), Path::new("/srv/upkeep/config/settings.json"));
        assert_eq!(paths.log_file(), Path::new("/srv/upkeep/data/upkeep.log"));
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let paths = AppPaths::under(temp.path());

        paths.ensure_dirs().expect("first call creates directories");
        paths.ensure_dirs().expect("second call is a no-op");

        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
    }
}
