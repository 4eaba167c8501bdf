use std::future::Future;

use log::{info, warn};

use crate::error::UpdateError;
use crate::snapshot::{BackupSet, SnapshotManager};

/// Run `update` with the project's guarded folders snapshotted first.
///
/// Nothing is attempted if the backup fails. If `update` fails the project is
/// restored to the backup; if that restore fails too, both errors are
/// returned. On success the backup is left in place for the caller to
/// discard.
///
/// # Errors
/// See [`UpdateError`] for the three failure outcomes.
pub async fn guarded_update<F, Fut, T, E>(
    snapshot: &SnapshotManager,
    set: &BackupSet,
    update: F,
) -> Result<T, UpdateError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    snapshot.backup(set).map_err(UpdateError::Backup)?;

    match update().await {
        Ok(value) => {
            info!("Update of {} succeeded", set.project_root.display());
            Ok(value)
        }
        Err(error) => {
            warn!("Update failed, restoring backup: {error}");
            match snapshot.restore(set) {
                Ok(()) => Err(UpdateError::Update(error)),
                Err(restore) => Err(UpdateError::RestoreFailed {
                    update: error,
                    restore,
                }),
            }
        }
    }
}
