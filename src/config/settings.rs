//! Runtime settings for awg-backup
//!
//! Settings are assembled once at startup from command-line options (which
//! fall back to environment variables) and then passed by reference to every
//! component. Nothing below `main` reads the environment.

use std::path::PathBuf;

use super::paths::BackupPaths;
use crate::error::{BackupError, BackupResult};

/// Default name of the AmneziaWG container
pub const DEFAULT_CONTAINER_NAME: &str = "amnezia-awg";

/// Default retention window in days
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Backup retention settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupRetention {
    /// Backup sets older than this many days are deleted
    pub max_age_days: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Where the container's filesystem comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerSource {
    /// Look the container up through the docker CLI
    Docker { name: String },
    /// Use a fixed directory as the container's filesystem root
    FixedRoot(PathBuf),
}

/// Settings for a single run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Backup and mirror roots
    pub paths: BackupPaths,
    /// Retention policy applied by cleanup
    pub retention: BackupRetention,
    /// How the live configuration files are located
    pub container: ContainerSource,
}

impl Settings {
    /// Build settings from the raw option values
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if either root is missing or empty.
    pub fn new(
        backup_root: Option<PathBuf>,
        mirror_root: Option<PathBuf>,
        retention_days: u32,
        container_name: String,
        container_root: Option<PathBuf>,
    ) -> BackupResult<Self> {
        let backup_root = require_path(backup_root, "LOCAL_BACKUP_DIR")?;
        let mirror_root = require_path(mirror_root, "NETWORK_BACKUP_DIR")?;

        if container_name.trim().is_empty() && container_root.is_none() {
            return Err(BackupError::Config(
                "Container name must not be empty".to_string(),
            ));
        }

        let container = match container_root {
            Some(root) => ContainerSource::FixedRoot(root),
            None => ContainerSource::Docker {
                name: container_name,
            },
        };

        Ok(Self {
            paths: BackupPaths::new(backup_root, mirror_root),
            retention: BackupRetention {
                max_age_days: retention_days,
            },
            container,
        })
    }
}

fn require_path(value: Option<PathBuf>, env_name: &str) -> BackupResult<PathBuf> {
    match value {
        Some(path) if !path.as_os_str().is_empty() => Ok(path),
        _ => Err(BackupError::Config(format!(
            "Environment variable {} is not set.",
            env_name
        ))),
    }
}
