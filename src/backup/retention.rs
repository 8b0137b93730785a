//! Deleting backup sets that fell out of the retention window
//!
//! Age is taken from the folder's modification time, not from its name, so
//! folders that were not created by this tool are aged the same way.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{BackupError, BackupResult};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Delete every subdirectory of `backup_root` older than `max_age_days`
///
/// Returns the deleted folders. Plain files at the top level are ignored.
pub fn prune(backup_root: &Path, max_age_days: u32) -> BackupResult<Vec<PathBuf>> {
    prune_at(backup_root, max_age_days, SystemTime::now())
}

/// [`prune`] against an explicit notion of "now"
pub fn prune_at(
    backup_root: &Path,
    max_age_days: u32,
    now: SystemTime,
) -> BackupResult<Vec<PathBuf>> {
    let window = Duration::from_secs(u64::from(max_age_days) * SECONDS_PER_DAY);
    // A window reaching before the epoch keeps everything
    let Some(cutoff) = now.checked_sub(window) else {
        return Ok(Vec::new());
    };

    let mut deleted = Vec::new();

    for entry in fs::read_dir(backup_root)
        .map_err(|e| BackupError::io("read directory", backup_root, e))?
    {
        let entry = entry.map_err(|e| BackupError::io("read entry in", backup_root, e))?;
        let path = entry.path();
        let metadata = entry
            .metadata()
            .map_err(|e| BackupError::io("read metadata of", &path, e))?;

        if !metadata.is_dir() {
            continue;
        }

        let modified = metadata
            .modified()
            .map_err(|e| BackupError::io("read modification time of", &path, e))?;

        if modified < cutoff {
            fs::remove_dir_all(&path).map_err(|e| BackupError::io("delete", &path, e))?;
            tracing::info!(path = %path.display(), "Old backup deleted");
            deleted.push(path);
        }
    }

    deleted.sort();
    Ok(deleted)
}
