//! The AmneziaWG client table
//!
//! `clientsTable` is a JSON array with one record per client:
//!
//! ```json
//! [
//!     {
//!         "clientId": "<peer public key>",
//!         "userData": {
//!             "clientName": "user1",
//!             "creationDate": "Mon Jun 17 10:00:00 2024"
//!         }
//!     }
//! ]
//! ```
//!
//! Existing records are kept as raw JSON and written back untouched; only
//! `clientId` is read from them. Records for new peers are built from
//! [`ClientRecord`].

use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::peers::Peer;
use crate::error::BackupResult;

/// Format of `creationDate`, as written by the AmneziaWG client
pub const CREATION_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// A client table entry created for a new peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    /// Public key of the matching WireGuard peer
    pub client_id: String,
    pub user_data: UserData,
}

/// Display data attached to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub client_name: String,
    pub creation_date: String,
}

impl ClientRecord {
    pub fn new(client_id: String, client_name: String, created: DateTime<Local>) -> Self {
        Self {
            client_id,
            user_data: UserData {
                client_name,
                creation_date: created.format(CREATION_DATE_FORMAT).to_string(),
            },
        }
    }
}

/// `clientId` of a raw table entry, if it has a string one
pub fn client_id(entry: &Value) -> Option<&str> {
    entry.get("clientId").and_then(Value::as_str)
}

/// Append a record for every peer whose public key is not in `clients`
///
/// New clients are named `user<N>`, with N continuing from the current
/// table length. Returns the number of records added.
pub fn add_missing_peers(
    clients: &mut Vec<Value>,
    peers: &[Peer],
    created: DateTime<Local>,
) -> BackupResult<usize> {
    let mut known: HashSet<String> = clients
        .iter()
        .filter_map(client_id)
        .map(str::to_string)
        .collect();
    let before = clients.len();

    for key in peers.iter().filter_map(|p| p.public_key.as_ref()) {
        if known.insert(key.clone()) {
            let name = format!("user{}", clients.len() + 1);
            let record = ClientRecord::new(key.clone(), name, created);
            clients.push(serde_json::to_value(record)?);
        }
    }

    Ok(clients.len() - before)
}
