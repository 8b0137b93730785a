//! Backup system for awg-backup
//!
//! Snapshots the AmneziaWG configuration into timestamped backup sets,
//! mirrors the set collection to a second location, expires old sets and
//! restores live files from a chosen set.
//!
//! # Architecture
//!
//! - `snapshot`: copies one live file into a backup set
//! - `mirror`: makes the mirror root hold the same top-level entries as the
//!   backup root
//! - `retention`: deletes sets whose folder is older than the retention window
//! - `records`: counts accounts in a tracked file for restore diagnostics
//! - `restore`: decides whether a live file needs replacing and replaces it
//! - `select`: interactive choice of a backup set
//! - `manager`: `BackupManager`, which composes the above into operations
//!
//! # Layout
//!
//! ```text
//! <backup root>/
//!     20240615_123456/
//!         wg0.conf
//!         clientsTable
//!     20240616_123456/
//!         ...
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use awg_backup::backup::BackupManager;
//! use awg_backup::container::{resolver_for, LivePaths};
//!
//! let live = LivePaths::resolve(resolver_for(&settings.container).as_ref());
//! let manager = BackupManager::new(&settings, &live);
//!
//! let report = manager.create_backup()?;
//! let results = manager.restore("20240615_123456")?;
//! ```

mod manager;
mod mirror;
mod records;
mod restore;
mod retention;
mod select;
mod snapshot;

pub use manager::{BackupInfo, BackupManager, BackupReport, FileRestore};
pub use mirror::{reconcile, SkipReason, SyncOutcome, SyncReport};
pub use records::{count_peers, count_records, RecordCount};
pub use restore::{restore_file, RestoreOutcome, RestoreReason, RestoreSkip};
pub use retention::{prune, prune_at};
pub use select::{numbered_lines, parse_choice, PromptSelector, Selector};
pub use snapshot::{snapshot, SnapshotOutcome};
