//! Path management for awg-backup
//!
//! The backup root holds one folder per backup set, named by its creation
//! timestamp. The mirror root is a second copy of the backup root, usually a
//! network mount.

use std::path::{Component, Path, PathBuf};

use crate::error::{BackupError, BackupResult};

/// Format of backup set folder names (`YYYYMMDD_HHMMSS`)
pub const BACKUP_NAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Manages the directories used by awg-backup
#[derive(Debug, Clone)]
pub struct BackupPaths {
    /// Primary backup root
    backup_root: PathBuf,
    /// Secondary root kept in sync with the backup root
    mirror_root: PathBuf,
}

impl BackupPaths {
    /// Create a new BackupPaths instance
    pub fn new(backup_root: PathBuf, mirror_root: PathBuf) -> Self {
        Self {
            backup_root,
            mirror_root,
        }
    }

    /// Get the primary backup root
    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Get the mirror root
    pub fn mirror_root(&self) -> &Path {
        &self.mirror_root
    }

    /// Get the folder of the backup set with the given name
    ///
    /// Returns `None` unless the name is a single plain path component, so a
    /// set name can never point outside the backup root.
    pub fn backup_set_dir(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.backup_root.join(name)),
            _ => None,
        }
    }

    /// Ensure the backup root exists
    ///
    /// The mirror root is never created: a missing mirror means the mount is
    /// absent and synchronization must be skipped.
    pub fn ensure_directories(&self) -> BackupResult<()> {
        std::fs::create_dir_all(&self.backup_root)
            .map_err(|e| BackupError::io("create backup root", &self.backup_root, e))
    }
}
