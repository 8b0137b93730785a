//! awg-backup - backup and restore for a containerized AmneziaWG server
//!
//! This library backs up the two files that make up the AmneziaWG server
//! state (`wg0.conf` and `clientsTable`), mirrors the backups to a second
//! location, expires old backups and restores the live files from a chosen
//! backup.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Backup roots, retention and container settings
//! - `error`: Custom error types
//! - `container`: Tracked files and locating them inside the container
//! - `storage`: Metadata-preserving file operations
//! - `backup`: Snapshot, mirror, retention and restore logic
//! - `clients`: Client table model and peer repair
//! - `cli`: Command handlers printing operator output
//! - `logging`: tracing setup
//!
//! # Example
//!
//! ```rust,ignore
//! use awg_backup::backup::BackupManager;
//! use awg_backup::config::Settings;
//! use awg_backup::container::{resolver_for, LivePaths};
//!
//! let settings = Settings::new(backup_root, mirror_root, 30, "amnezia-awg".into(), None)?;
//! let live = LivePaths::resolve(resolver_for(&settings.container).as_ref());
//! BackupManager::new(&settings, &live).create_backup()?;
//! ```

pub mod backup;
pub mod cli;
pub mod clients;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod storage;

pub use error::{BackupError, BackupResult};
