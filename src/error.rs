//! Custom error types for awg-backup
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::Path;

use thiserror::Error;

/// The main error type for awg-backup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors (missing roots, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The operator picked a backup that does not exist in the list
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Container runtime lookups
    #[error("Container error: {0}")]
    Container(String),
}

impl BackupError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(action: &str, path: &Path, err: std::io::Error) -> Self {
        Self::Io(format!("Failed to {} {}: {}", action, path.display(), err))
    }

    /// Create a "not found" error for backup sets
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for awg-backup operations
pub type BackupResult<T> = Result<T, BackupError>;
