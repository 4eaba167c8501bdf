use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use upkeep_backend::FileSystem;
use upkeep_platform::UpdateSettings;

use crate::error::{SnapshotAction, SnapshotError};
use crate::fs::LocalFileSystem;

/// Project-relative folders guarded by a snapshot, plus where the snapshot
/// lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSet {
    pub folders: Vec<String>,
    pub backup_root: PathBuf,
    pub project_root: PathBuf,
}

impl BackupSet {
    pub fn new<I, S>(
        folders: I,
        backup_root: impl Into<PathBuf>,
        project_root: impl Into<PathBuf>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            backup_root: backup_root.into(),
            project_root: project_root.into(),
        }
    }

    /// The folders and backup location configured in `settings`, applied to
    /// the project at `project_dir`.
    #[must_use]
    pub fn from_settings(settings: &UpdateSettings, project_dir: &Path) -> Self {
        Self::new(
            settings.backup_folders.iter().cloned(),
            settings.backup_root(project_dir),
            project_dir,
        )
    }
}

/// Copies a fixed set of project folders aside and puts them back.
///
/// Not safe to run concurrently against the same roots; callers serialize
/// updates per project.
#[derive(Clone)]
pub struct SnapshotManager {
    fs: Arc<dyn FileSystem>,
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new(Arc::new(LocalFileSystem))
    }
}

impl SnapshotManager {
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Replace any previous backup at `set.backup_root` with a copy of every
    /// folder in `set.folders` that currently exists in the project. Missing
    /// folders are skipped and stay absent from the backup.
    ///
    /// # Errors
    /// Returns the first filesystem failure, naming the folder and root.
    pub fn backup(&self, set: &BackupSet) -> Result<(), SnapshotError> {
        let root = &set.backup_root;
        info!("Backing up {} folder(s) to {}", set.folders.len(), root.display());

        if self.fs.exists(root) {
            self.fs
                .delete_directory(root)
                .map_err(|e| SnapshotError::root(SnapshotAction::ClearBackup, root, e))?;
        }
        self.fs
            .create_directory(root)
            .map_err(|e| SnapshotError::root(SnapshotAction::CreateBackupRoot, root, e))?;

        for folder in &set.folders {
            let source = set.project_root.join(folder);
            if !self.fs.exists(&source) {
                debug!("Skipping {folder}: not present in project");
                continue;
            }

            let dest_into = parent_of(&root.join(folder), root);
            self.fs
                .copy_directory(&source, &dest_into)
                .map_err(|e| SnapshotError::io(SnapshotAction::Copy, folder, root, e))?;
            debug!("Backed up {folder}");
        }

        info!("Backup complete at {}", root.display());
        Ok(())
    }

    /// Make the project's guarded folders match the backup exactly: every
    /// folder in the set is removed from the project, then only those present
    /// in the backup are copied back. A folder created after the backup is
    /// therefore deleted.
    ///
    /// # Errors
    /// Returns the first filesystem failure, naming the folder and root. The
    /// project may be partially restored at that point.
    pub fn restore(&self, set: &BackupSet) -> Result<(), SnapshotError> {
        let root = &set.backup_root;
        info!("Restoring project {} from {}", set.project_root.display(), root.display());

        for folder in &set.folders {
            let target = set.project_root.join(folder);
            self.fs.delete_directory(&target).map_err(|e| {
                SnapshotError::io(
                    SnapshotAction::RemoveProjectFolder,
                    folder,
                    &set.project_root,
                    e,
                )
            })?;

            let saved = root.join(folder);
            if !self.fs.exists(&saved) {
                debug!("No backup of {folder}; leaving it absent");
                continue;
            }

            let dest_into = parent_of(&target, &set.project_root);
            self.fs
                .copy_directory(&saved, &dest_into)
                .map_err(|e| SnapshotError::io(SnapshotAction::Restore, folder, root, e))?;
            debug!("Restored {folder}");
        }

        info!("Restore complete for {}", set.project_root.display());
        Ok(())
    }
}

/// Directory a folder is copied into, so nested names like `app/App_Resources`
/// keep their relative position.
fn parent_of(path: &Path, fallback: &Path) -> PathBuf {
    path.parent().map_or_else(|| fallback.to_path_buf(), Path::to_path_buf)
}
