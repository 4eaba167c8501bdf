use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use upkeep_backend::ServiceError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Registry(#[from] ServiceError),

    #[error("No framework package for platform '{platform}': {source}")]
    Platform {
        platform: String,
        #[source]
        source: ServiceError,
    },

    #[error("Cannot resolve {name}@{specifier} to an exact version (got {})", .resolved.as_deref().unwrap_or("nothing"))]
    Unresolvable {
        name: String,
        specifier: String,
        resolved: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotAction {
    ClearBackup,
    CreateBackupRoot,
    Copy,
    RemoveProjectFolder,
    Restore,
}

impl fmt::Display for SnapshotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClearBackup => write!(f, "clear previous backup"),
            Self::CreateBackupRoot => write!(f, "create backup root"),
            Self::Copy => write!(f, "copy into backup"),
            Self::RemoveProjectFolder => write!(f, "remove project folder"),
            Self::Restore => write!(f, "restore from backup"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to {action} at {}: {source}", .root.display())]
    Root {
        action: SnapshotAction,
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to {action} for '{folder}' (root {}): {source}", .root.display())]
    Io {
        action: SnapshotAction,
        folder: String,
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    pub(crate) fn root(
        action: SnapshotAction,
        root: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Root {
            action,
            root: root.into(),
            source,
        }
    }

    pub(crate) fn io(
        action: SnapshotAction,
        folder: impl Into<String>,
        root: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            action,
            folder: folder.into(),
            root: root.into(),
            source,
        }
    }
}

/// Outcome of a failed guarded update.
#[derive(Error, Debug)]
pub enum UpdateError<E: std::error::Error + 'static> {
    #[error("Backup failed, project left untouched: {0}")]
    Backup(#[source] SnapshotError),

    #[error("Update failed, project restored from backup: {0}")]
    Update(#[source] E),

    #[error("Update failed ({update}) and restoring the backup also failed: {restore}")]
    RestoreFailed {
        update: E,
        #[source]
        restore: SnapshotError,
    },
}
