//! Client table CLI command

use crate::clients::repair_clients_table;
use crate::container::{LivePaths, TrackedFile};
use crate::error::BackupResult;

/// Add missing peers to the live client table
pub fn handle_repair_clients(live: &LivePaths) -> BackupResult<()> {
    let (Some(wg_conf), Some(clients_table)) = (
        live.path(TrackedFile::WgConf),
        live.path(TrackedFile::ClientsTable),
    ) else {
        println!("Live configuration files are unknown (container not found), skipping repair.");
        return Ok(());
    };

    let added = repair_clients_table(wg_conf, clients_table)?;
    if added == 0 {
        println!("Client table already lists every peer.");
    } else {
        println!("Added {} client(s) to {}", added, clients_table.display());
    }

    Ok(())
}
