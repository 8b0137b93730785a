//! Backup CLI commands
//!
//! Bridges the command-line operations to `BackupManager` and prints the
//! results for the operator.

use std::path::PathBuf;

use crate::backup::{
    numbered_lines, BackupManager, FileRestore, RecordCount, RestoreOutcome, RestoreReason,
    RestoreSkip, Selector, SnapshotOutcome, SyncOutcome,
};
use crate::container::TrackedFile;
use crate::error::BackupResult;

/// Create a backup set, mirror it and prune old sets
pub fn handle_backup(manager: &BackupManager<'_>) -> BackupResult<()> {
    let report = manager.create_backup()?;

    for (_, outcome) in &report.snapshots {
        match outcome {
            SnapshotOutcome::Created(dest) => println!("Backup created: {}", dest.display()),
            SnapshotOutcome::NotFound(source) => println!("File {} not found.", source.display()),
        }
    }

    if !report.is_complete() {
        println!("Error creating backups.");
        return Ok(());
    }

    println!("Backups successfully created in {}", report.set_dir.display());

    if let Some(sync) = &report.sync {
        print_sync(sync, manager);
    }
    print_pruned(&report.pruned);

    Ok(())
}

/// Restore from the named set, or from one picked with `selector`
pub fn handle_restore(
    manager: &BackupManager<'_>,
    name: Option<&str>,
    selector: &mut dyn Selector,
) -> BackupResult<()> {
    let backups = manager.list_backups()?;
    if backups.is_empty() {
        println!("No backups available.");
        return Ok(());
    }

    let results = match name {
        Some(name) => {
            println!("Restoring from backup {}", name);
            manager.restore(name)?
        }
        None => {
            let chosen = manager.choose_backup(&backups, selector)?;
            println!("Restoring from backup {}", chosen.name);
            manager.restore_from(&chosen.path)
        }
    };

    for result in &results {
        print_file_restore(result);
    }

    Ok(())
}

/// Delete expired backup sets
pub fn handle_cleanup(manager: &BackupManager<'_>) -> BackupResult<()> {
    let pruned = manager.cleanup()?;
    if pruned.is_empty() {
        println!("No old backups to delete.");
    }
    print_pruned(&pruned);
    Ok(())
}

/// List backup sets, oldest first
pub fn handle_list(manager: &BackupManager<'_>, verbose: bool) -> BackupResult<()> {
    let backups = manager.list_backups()?;

    if backups.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    if !verbose {
        let names: Vec<String> = backups.iter().map(|b| b.name.clone()).collect();
        for line in numbered_lines(&names) {
            println!("{}", line);
        }
        return Ok(());
    }

    let now = chrono::Local::now();
    for (i, backup) in backups.iter().enumerate() {
        let files: Vec<&str> = backup.files.iter().map(TrackedFile::file_name).collect();
        let contents = if files.is_empty() {
            "empty".to_string()
        } else {
            files.join(", ")
        };

        println!(
            "{}. {} ({} ago, {}) [{}]",
            i + 1,
            backup.name,
            format_duration(now.signed_duration_since(backup.modified)),
            format_size(backup.size_bytes),
            contents,
        );
    }

    println!();
    println!("Total: {} backup(s)", backups.len());

    Ok(())
}

/// Mirror the backup root
pub fn handle_sync(manager: &BackupManager<'_>) -> BackupResult<()> {
    let outcome = manager.sync()?;
    print_sync(&outcome, manager);
    Ok(())
}

fn print_sync(outcome: &SyncOutcome, manager: &BackupManager<'_>) {
    let (from, to) = manager.sync_roots();

    match outcome {
        SyncOutcome::Skipped(reason) => {
            println!(
                "Directory {} is {}. Synchronization skipped.",
                to.display(),
                reason
            );
        }
        SyncOutcome::Synced(report) => {
            println!("Synchronized directories: {} -> {}", from.display(), to.display());
            for path in &report.copied {
                println!("Copied {}", path.display());
            }
            for path in &report.removed {
                println!("Deleted {}", path.display());
            }
        }
    }
}

fn print_pruned(pruned: &[PathBuf]) {
    for path in pruned {
        println!("Old backup deleted: {}", path.display());
    }
}

fn print_file_restore(result: &FileRestore) {
    let backup = result.backup_path.display();

    let Some(live) = result.live_path.as_deref() else {
        println!(
            "Live path of {} is unknown (container not found), skipping.",
            result.file
        );
        return;
    };

    let outcome = match &result.outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("Restoring {} from {}", live.display(), backup);
            eprintln!("Error: {}", e);
            return;
        }
    };

    match outcome {
        RestoreOutcome::NotFound => println!("Backup {} not found.", backup),
        RestoreOutcome::Skipped(RestoreSkip::Identical) => {
            println!("Restoring {} from {}", live.display(), backup);
            println!("Files are identical, no overwrite needed.");
        }
        RestoreOutcome::Restored(reason) => {
            println!("Restoring {} from {}", live.display(), backup);
            match reason {
                RestoreReason::CreatedNew => println!(
                    "Source file {} not found, a new file will be created.",
                    live.display()
                ),
                RestoreReason::ReplacedEmpty => println!(
                    "Source file {} is empty, it will be overwritten.",
                    live.display()
                ),
                RestoreReason::Replaced {
                    live: live_count,
                    backup: backup_count,
                } => {
                    print_count_warning(live_count);
                    print_count_warning(backup_count);
                    println!("Number of accounts in source file: {}", live_count.count);
                    println!("Number of accounts in backup: {}", backup_count.count);
                }
            }
            println!("File {} successfully restored from {}", live.display(), backup);
        }
    }
}

fn print_count_warning(count: &RecordCount) {
    if let Some(error) = &count.format_error {
        println!("Warning: {}", error);
    }
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    format!("{}d", hours / 24)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_duration(chrono::Duration::minutes(5)), "5m");
        assert_eq!(format_duration(chrono::Duration::hours(3)), "3h");
        assert_eq!(format_duration(chrono::Duration::days(45)), "45d");
        assert_eq!(format_duration(chrono::Duration::seconds(-3)), "0s");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
