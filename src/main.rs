use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use awg_backup::backup::{BackupManager, PromptSelector};
use awg_backup::cli;
use awg_backup::config::settings::{DEFAULT_CONTAINER_NAME, DEFAULT_RETENTION_DAYS};
use awg_backup::config::Settings;
use awg_backup::container::{resolver_for, LivePaths};
use awg_backup::error::BackupResult;
use awg_backup::logging;

#[derive(Parser)]
#[command(
    name = "awg-backup",
    version,
    about = "Backup, restore, and backup management for an AmneziaWG container",
    long_about = "awg-backup keeps timestamped backups of the AmneziaWG server \
                  configuration (wg0.conf and clientsTable), mirrors them to a \
                  second directory and restores them on demand. Operations can \
                  be combined and always run in the order listed below.",
    after_help = "Examples:\n  awg-backup --backup\n  awg-backup --restore\n  \
                  awg-backup --restore 20230615_123456\n  awg-backup --cleanup\n  \
                  awg-backup --list\n  awg-backup --sync"
)]
struct Cli {
    /// Create a backup of configuration files
    #[arg(long)]
    backup: bool,

    /// Restore configuration files from a backup. If NAME is not specified, a selection will be prompted.
    #[arg(long, value_name = "NAME", num_args = 0..=1)]
    restore: Option<Option<String>>,

    /// Delete old backups
    #[arg(long)]
    cleanup: bool,

    /// List all backups
    #[arg(long)]
    list: bool,

    /// Synchronize local backup directory with network backup directory
    #[arg(long)]
    sync: bool,

    /// Add clientsTable entries for peers that only exist in wg0.conf
    #[arg(long)]
    repair_clients: bool,

    /// Show age, size and contents when listing
    #[arg(short, long)]
    verbose: bool,

    /// Local backup directory
    #[arg(long, env = "LOCAL_BACKUP_DIR", value_name = "DIR")]
    backup_dir: Option<PathBuf>,

    /// Network backup directory kept in sync with the local one
    #[arg(long, env = "NETWORK_BACKUP_DIR", value_name = "DIR")]
    mirror_dir: Option<PathBuf>,

    /// Backups older than this many days are deleted
    #[arg(long, env = "BACKUP_RETENTION_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    retention_days: u32,

    /// Name of the AmneziaWG container
    #[arg(long, env = "AWG_CONTAINER_NAME", default_value = DEFAULT_CONTAINER_NAME)]
    container: String,

    /// Use this directory as the container filesystem instead of asking docker
    #[arg(long, env = "AWG_CONTAINER_ROOT", value_name = "DIR")]
    container_root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "AWG_BACKUP_LOG", default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn has_operation(&self) -> bool {
        self.backup
            || self.restore.is_some()
            || self.cleanup
            || self.list
            || self.sync
            || self.repair_clients
    }

    fn needs_live_paths(&self) -> bool {
        self.backup || self.restore.is_some() || self.repair_clients
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.has_operation() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    logging::init(&cli.log_level)?;

    let settings = Settings::new(
        cli.backup_dir.clone(),
        cli.mirror_dir.clone(),
        cli.retention_days,
        cli.container.clone(),
        cli.container_root.clone(),
    )?;
    settings.paths.ensure_directories()?;

    let live = if cli.needs_live_paths() {
        let live = LivePaths::resolve(resolver_for(&settings.container).as_ref());
        if let Some(reason) = live.unresolved_reason() {
            eprintln!("Error retrieving container paths: {}", reason);
        }
        live
    } else {
        LivePaths::default()
    };

    let manager = BackupManager::new(&settings, &live);

    if cli.backup {
        report(cli::handle_backup(&manager));
    }

    if let Some(name) = &cli.restore {
        let mut selector = PromptSelector::stdin();
        report(cli::handle_restore(&manager, name.as_deref(), &mut selector));
    }

    if cli.cleanup {
        report(cli::handle_cleanup(&manager));
    }

    if cli.list {
        report(cli::handle_list(&manager, cli.verbose));
    }

    if cli.sync {
        report(cli::handle_sync(&manager));
    }

    if cli.repair_clients {
        report(cli::handle_repair_clients(&live));
    }

    Ok(())
}

/// Print a failed operation and carry on with the next one
fn report(result: BackupResult<()>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Operation failed");
        eprintln!("Error: {}", e);
    }
}
