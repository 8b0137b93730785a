//! Configuration module for awg-backup
//!
//! This module provides configuration management including:
//! - Backup and mirror root paths
//! - Retention and container lookup settings

pub mod paths;
pub mod settings;

pub use paths::BackupPaths;
pub use settings::{BackupRetention, ContainerSource, Settings};
