//! CLI command handlers
//!
//! This module contains the implementation of CLI operations,
//! bridging the clap argument parsing with the backup layer.

pub mod backup;
pub mod clients;

pub use backup::{handle_backup, handle_cleanup, handle_list, handle_restore, handle_sync};
pub use clients::handle_repair_clients;
