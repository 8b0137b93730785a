//! Keeping the client table in step with the WireGuard peers
//!
//! Peers added to `wg0.conf` by hand (or restored from an older backup) have
//! no entry in `clientsTable`, so the AmneziaWG client cannot show them.
//! [`repair_clients_table`] adds a generic entry for each such peer.

mod peers;
mod table;

use std::fs;
use std::path::Path;

use chrono::Local;
use serde_json::Value;

pub use peers::{parse_peers, Peer};
pub use table::{add_missing_peers, client_id, ClientRecord, UserData, CREATION_DATE_FORMAT};

use crate::error::{BackupError, BackupResult};
use crate::storage::write_json_atomic;

/// Read the raw entries of a client table; a missing file is an empty table
pub fn read_clients_table(path: &Path) -> BackupResult<Vec<Value>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(BackupError::io("read", path, e)),
    };

    serde_json::from_slice(&contents)
        .map_err(|e| BackupError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Add client table entries for peers missing from it
///
/// The table is only rewritten when something was added. Returns the number
/// of new entries.
pub fn repair_clients_table(wg_conf: &Path, clients_table: &Path) -> BackupResult<usize> {
    let text = fs::read_to_string(wg_conf).map_err(|e| BackupError::io("read", wg_conf, e))?;
    let peers = parse_peers(&text);

    let mut clients = read_clients_table(clients_table)?;
    let added = add_missing_peers(&mut clients, &peers, Local::now())?;

    if added > 0 {
        write_json_atomic(clients_table, &clients)?;
        tracing::info!(added, path = %clients_table.display(), "Client table updated");
    }

    Ok(added)
}
