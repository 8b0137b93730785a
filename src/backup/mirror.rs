//! Mirroring the backup root to a secondary location
//!
//! Only top-level entry names are compared. Backup sets never change once
//! written, so an entry present on both sides is left alone; entries missing
//! from the mirror are copied over whole and entries the source no longer has
//! are deleted from the mirror.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BackupError, BackupResult};
use crate::storage::{copy_tree, is_writable_dir, remove_entry};

/// Result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The mirror now holds the same top-level entries as the source
    Synced(SyncReport),
    /// Nothing was touched
    Skipped(SkipReason),
}

/// Why a reconciliation pass did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The mirror is missing or cannot be written to
    NotWritable,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotWritable => f.write_str("not writable"),
        }
    }
}

/// What a successful pass changed in the mirror
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Mirror paths that were copied in
    pub copied: Vec<PathBuf>,
    /// Mirror paths that were deleted
    pub removed: Vec<PathBuf>,
}

impl SyncReport {
    /// Whether the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.copied.is_empty() && self.removed.is_empty()
    }
}

/// Make the top-level entries of `mirror_dir` match those of `source_dir`
///
/// The first failing copy or delete aborts the pass. Changes already applied
/// stay in place; running again converges the mirror.
pub fn reconcile(source_dir: &Path, mirror_dir: &Path) -> BackupResult<SyncOutcome> {
    if !is_writable_dir(mirror_dir) {
        tracing::warn!(mirror = %mirror_dir.display(), "Mirror not writable, sync skipped");
        return Ok(SyncOutcome::Skipped(SkipReason::NotWritable));
    }

    let source_entries = entry_names(source_dir)?;
    let mirror_entries = entry_names(mirror_dir)?;
    let mut report = SyncReport::default();

    for name in source_entries.difference(&mirror_entries) {
        let from = source_dir.join(name);
        let to = mirror_dir.join(name);
        copy_tree(&from, &to)?;
        tracing::debug!(from = %from.display(), to = %to.display(), "Copied");
        report.copied.push(to);
    }

    for name in mirror_entries.difference(&source_entries) {
        let stale = mirror_dir.join(name);
        remove_entry(&stale)?;
        tracing::debug!(path = %stale.display(), "Deleted");
        report.removed.push(stale);
    }

    tracing::info!(
        copied = report.copied.len(),
        removed = report.removed.len(),
        "Mirror synchronized"
    );
    Ok(SyncOutcome::Synced(report))
}

/// Names of the immediate children of `dir`, exactly as stored on disk
fn entry_names(dir: &Path) -> BackupResult<BTreeSet<OsString>> {
    let mut names = BTreeSet::new();

    for entry in fs::read_dir(dir).map_err(|e| BackupError::io("read directory", dir, e))? {
        let entry = entry.map_err(|e| BackupError::io("read entry in", dir, e))?;
        names.insert(entry.file_name());
    }

    Ok(names)
}
