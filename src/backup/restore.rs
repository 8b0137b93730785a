//! Restoring a single tracked file from a backup set
//!
//! The live file is replaced when it is missing, empty, or differs from the
//! backup copy. Identical files are left alone. When a non-empty live file is
//! about to be replaced, both sides are counted so the operator can see how
//! many accounts are gained or lost; the counts never block the restore.

use std::path::Path;

use super::records::{count_records, RecordCount};
use crate::container::TrackedFile;
use crate::error::{BackupError, BackupResult};
use crate::storage::{copy_with_metadata, files_identical};

/// Result of restoring one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The live file now matches the backup
    Restored(RestoreReason),
    /// The live file was left as it was
    Skipped(RestoreSkip),
    /// The backup copy does not exist; nothing was touched
    NotFound,
}

/// Why the live file was overwritten
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreReason {
    /// There was no live file, a new one was created
    CreatedNew,
    /// The live file was empty
    ReplacedEmpty,
    /// The live file had different contents
    Replaced {
        live: RecordCount,
        backup: RecordCount,
    },
}

/// Why the live file was not overwritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSkip {
    /// Live and backup contents are byte-identical
    Identical,
}

/// Restore `live_path` from `backup_path`
pub fn restore_file(
    file: TrackedFile,
    live_path: &Path,
    backup_path: &Path,
) -> BackupResult<RestoreOutcome> {
    if !backup_path.is_file() {
        tracing::debug!(backup = %backup_path.display(), "Backup copy missing");
        return Ok(RestoreOutcome::NotFound);
    }

    let reason = match std::fs::metadata(live_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => RestoreReason::CreatedNew,
        Err(e) => return Err(BackupError::io("read metadata of", live_path, e)),
        Ok(metadata) if metadata.len() == 0 => RestoreReason::ReplacedEmpty,
        Ok(_) => {
            if files_identical(live_path, backup_path)? {
                tracing::debug!(live = %live_path.display(), "Live file identical to backup");
                return Ok(RestoreOutcome::Skipped(RestoreSkip::Identical));
            }
            RestoreReason::Replaced {
                live: count_records(file, live_path)?,
                backup: count_records(file, backup_path)?,
            }
        }
    };

    copy_with_metadata(backup_path, live_path)?;
    tracing::info!(
        live = %live_path.display(),
        backup = %backup_path.display(),
        "File restored"
    );

    Ok(RestoreOutcome::Restored(reason))
}
