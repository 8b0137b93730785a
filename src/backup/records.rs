//! Counting accounts in the tracked files
//!
//! Counts are only shown to the operator when a restore replaces a file with
//! different contents; they never influence what gets restored.

use std::fs;
use std::path::Path;

use crate::container::TrackedFile;
use crate::error::{BackupError, BackupResult};

/// Number of records in a file, plus a warning if it could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCount {
    pub count: usize,
    /// Set when the file exists but is not in the expected format
    pub format_error: Option<String>,
}

impl RecordCount {
    fn counted(count: usize) -> Self {
        Self {
            count,
            format_error: None,
        }
    }
}

/// Count the records in `path` using the rule for `file`
///
/// Missing and empty files count as zero.
pub fn count_records(file: TrackedFile, path: &Path) -> BackupResult<RecordCount> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RecordCount::counted(0)),
        Err(e) => return Err(BackupError::io("read", path, e)),
    };

    if contents.is_empty() {
        return Ok(RecordCount::counted(0));
    }

    let count = match file {
        TrackedFile::WgConf => RecordCount::counted(count_peers(&String::from_utf8_lossy(&contents))),
        TrackedFile::ClientsTable => count_clients(&contents, path),
    };
    Ok(count)
}

/// Number of lines that are exactly `[Peer]` once trimmed
pub fn count_peers(text: &str) -> usize {
    text.lines().filter(|line| line.trim() == "[Peer]").count()
}

fn count_clients(contents: &[u8], path: &Path) -> RecordCount {
    let problem = match serde_json::from_slice::<serde_json::Value>(contents) {
        Ok(serde_json::Value::Array(clients)) => return RecordCount::counted(clients.len()),
        Ok(_) => "is not a JSON array".to_string(),
        Err(e) => format!("is not valid JSON: {}", e),
    };

    tracing::warn!(path = %path.display(), %problem, "Client table could not be counted");
    RecordCount {
        count: 0,
        format_error: Some(format!("file {} {}", path.display(), problem)),
    }
}
