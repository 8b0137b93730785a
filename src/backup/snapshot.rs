//! Copying a single live file into a backup set

use std::path::{Path, PathBuf};

use crate::error::{BackupError, BackupResult};
use crate::storage::copy_with_metadata;

/// Result of snapshotting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// The file was copied to this path
    Created(PathBuf),
    /// The source file does not exist; nothing was written
    NotFound(PathBuf),
}

impl SnapshotOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Copy `source` into `dest_dir` under its own file name
///
/// Contents, permission bits and timestamps are preserved. A missing source
/// produces no file at all.
pub fn snapshot(source: &Path, dest_dir: &Path) -> BackupResult<SnapshotOutcome> {
    if !source.is_file() {
        tracing::debug!(source = %source.display(), "Snapshot source missing");
        return Ok(SnapshotOutcome::NotFound(source.to_path_buf()));
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| BackupError::Io(format!("Not a file path: {}", source.display())))?;
    let dest = dest_dir.join(file_name);

    copy_with_metadata(source, &dest)?;
    tracing::debug!(source = %source.display(), dest = %dest.display(), "Snapshot created");

    Ok(SnapshotOutcome::Created(dest))
}
