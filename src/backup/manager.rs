//! Backup manager for awg-backup
//!
//! Ties the individual steps together: a backup snapshots both tracked files
//! into a new timestamped set, mirrors the backup root and prunes expired
//! sets; a restore puts both files of a chosen set back in place.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::mirror::{reconcile, SyncOutcome};
use super::restore::{restore_file, RestoreOutcome};
use super::retention::prune;
use super::select::Selector;
use super::snapshot::{snapshot, SnapshotOutcome};
use crate::config::paths::BACKUP_NAME_FORMAT;
use crate::config::Settings;
use crate::container::{LivePaths, TrackedFile};
use crate::error::{BackupError, BackupResult};

/// A backup set found in the backup root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    /// Folder name (the creation timestamp for sets made by this tool),
    /// decoded lossily for display
    pub name: String,
    /// Full path to the folder, exact even when the name is not UTF-8
    pub path: PathBuf,
    /// Folder modification time
    pub modified: DateTime<Local>,
    /// Total size of the files directly inside the folder
    pub size_bytes: u64,
    /// Tracked files present in the set
    pub files: Vec<TrackedFile>,
}

/// What a backup run did
#[derive(Debug)]
pub struct BackupReport {
    /// Folder of the new backup set
    pub set_dir: PathBuf,
    /// Per-file snapshot results
    pub snapshots: Vec<(TrackedFile, SnapshotOutcome)>,
    /// Mirror result; `None` when the snapshot was incomplete
    pub sync: Option<SyncOutcome>,
    /// Backup sets removed by retention
    pub pruned: Vec<PathBuf>,
}

impl BackupReport {
    /// Whether every tracked file made it into the set
    pub fn is_complete(&self) -> bool {
        self.snapshots.iter().all(|(_, outcome)| outcome.is_created())
    }
}

/// Result of restoring one tracked file
#[derive(Debug)]
pub struct FileRestore {
    pub file: TrackedFile,
    /// Live path, `None` if the container could not be resolved
    pub live_path: Option<PathBuf>,
    pub backup_path: PathBuf,
    /// A failure here does not stop the other files from being restored
    pub outcome: BackupResult<RestoreOutcome>,
}

/// Runs backup, restore, list, cleanup and sync against one configuration
pub struct BackupManager<'a> {
    settings: &'a Settings,
    live: &'a LivePaths,
}

impl<'a> BackupManager<'a> {
    /// Create a new BackupManager
    pub fn new(settings: &'a Settings, live: &'a LivePaths) -> Self {
        Self { settings, live }
    }

    /// Create a backup set named after the current local time
    pub fn create_backup(&self) -> BackupResult<BackupReport> {
        let name = Local::now().format(BACKUP_NAME_FORMAT).to_string();
        self.create_backup_named(&name)
    }

    /// Create a backup set with the given name, then mirror and prune
    ///
    /// Mirroring and pruning only happen when every tracked file was copied.
    /// An incomplete set stays on disk.
    pub fn create_backup_named(&self, name: &str) -> BackupResult<BackupReport> {
        let set_dir = self
            .settings
            .paths
            .backup_set_dir(name)
            .ok_or_else(|| BackupError::backup_not_found(name))?;

        fs::create_dir_all(&set_dir)
            .map_err(|e| BackupError::io("create backup folder", &set_dir, e))?;

        let mut snapshots = Vec::with_capacity(TrackedFile::ALL.len());
        for file in TrackedFile::ALL {
            let outcome = match self.live.path(file) {
                Some(live_path) => snapshot(live_path, &set_dir)?,
                None => SnapshotOutcome::NotFound(PathBuf::from(file.container_path())),
            };
            snapshots.push((file, outcome));
        }

        let mut report = BackupReport {
            set_dir,
            snapshots,
            sync: None,
            pruned: Vec::new(),
        };

        if !report.is_complete() {
            tracing::warn!(set = %report.set_dir.display(), "Backup incomplete, skipping sync and cleanup");
            return Ok(report);
        }

        report.sync = Some(self.sync()?);
        report.pruned = self.cleanup()?;

        Ok(report)
    }

    /// List backup sets, oldest modification time first
    pub fn list_backups(&self) -> BackupResult<Vec<BackupInfo>> {
        let root = self.settings.paths.backup_root();
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(root).map_err(|e| BackupError::io("read directory", root, e))? {
            let entry = entry.map_err(|e| BackupError::io("read entry in", root, e))?;
            let path = entry.path();
            let metadata = entry
                .metadata()
                .map_err(|e| BackupError::io("read metadata of", &path, e))?;

            if !metadata.is_dir() {
                continue;
            }

            let modified = metadata
                .modified()
                .map_err(|e| BackupError::io("read modification time of", &path, e))?;

            backups.push(BackupInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                modified: DateTime::from(modified),
                size_bytes: folder_size(&path),
                files: TrackedFile::ALL
                    .into_iter()
                    .filter(|file| path.join(file.file_name()).is_file())
                    .collect(),
                path,
            });
        }

        backups.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

        Ok(backups)
    }

    /// Ask `selector` which of `backups` to restore
    ///
    /// The most recent set is the default. Anything outside the list is an
    /// `InvalidSelection` error.
    pub fn choose_backup(
        &self,
        backups: &[BackupInfo],
        selector: &mut dyn Selector,
    ) -> BackupResult<BackupInfo> {
        let names: Vec<String> = backups.iter().map(|b| b.name.clone()).collect();
        let choice = selector.select(&names, backups.len())?;

        choice
            .checked_sub(1)
            .and_then(|index| backups.get(index))
            .cloned()
            .ok_or_else(|| BackupError::InvalidSelection(choice.to_string()))
    }

    /// Restore both tracked files from the named backup set
    pub fn restore(&self, name: &str) -> BackupResult<Vec<FileRestore>> {
        let set_dir = self
            .settings
            .paths
            .backup_set_dir(name)
            .ok_or_else(|| BackupError::backup_not_found(name))?;

        Ok(self.restore_from(&set_dir))
    }

    /// Restore both tracked files from the backup set at `set_dir`
    pub fn restore_from(&self, set_dir: &Path) -> Vec<FileRestore> {
        TrackedFile::ALL
            .into_iter()
            .map(|file| {
                let backup_path = set_dir.join(file.file_name());
                let live_path = self.live.path(file).map(PathBuf::from);

                let outcome = match &live_path {
                    Some(live) => restore_file(file, live, &backup_path),
                    None => Ok(RestoreOutcome::NotFound),
                };
                if let Err(e) = &outcome {
                    tracing::error!(file = %file, error = %e, "Restore failed");
                }

                FileRestore {
                    file,
                    live_path,
                    backup_path,
                    outcome,
                }
            })
            .collect()
    }

    /// Delete backup sets older than the retention window
    pub fn cleanup(&self) -> BackupResult<Vec<PathBuf>> {
        prune(
            self.settings.paths.backup_root(),
            self.settings.retention.max_age_days,
        )
    }

    /// Source and destination of [`BackupManager::sync`]
    pub fn sync_roots(&self) -> (&Path, &Path) {
        (
            self.settings.paths.backup_root(),
            self.settings.paths.mirror_root(),
        )
    }

    /// Mirror the backup root
    pub fn sync(&self) -> BackupResult<SyncOutcome> {
        reconcile(
            self.settings.paths.backup_root(),
            self.settings.paths.mirror_root(),
        )
    }
}

/// Sum of the sizes of the plain files directly inside `dir`
fn folder_size(dir: &Path) -> u64 {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.metadata().ok())
                .filter(|metadata| metadata.is_file())
                .map(|metadata| metadata.len())
                .sum()
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::mirror::SyncReport;
    use crate::backup::restore::RestoreReason;
    use crate::backup::select::PromptSelector;
    use std::fs::File;
    use std::io::Cursor;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    struct TestEnv {
        _temp: TempDir,
        settings: Settings,
        container_root: PathBuf,
    }

    impl TestEnv {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let backup_root = temp.path().join("local");
            let mirror_root = temp.path().join("nas");
            let container_root = temp.path().join("merged");
            fs::create_dir_all(&mirror_root).unwrap();
            fs::create_dir_all(container_root.join("opt/amnezia/awg")).unwrap();

            let settings = Settings::new(
                Some(backup_root),
                Some(mirror_root),
                30,
                "amnezia-awg".to_string(),
                Some(container_root.clone()),
            )
            .unwrap();
            settings.paths.ensure_directories().unwrap();

            Self {
                _temp: temp,
                settings,
                container_root,
            }
        }

        fn live(&self) -> LivePaths {
            LivePaths::under_root(&self.container_root)
        }

        fn write_live(&self, file: TrackedFile, contents: &str) {
            fs::write(self.container_root.join(file.container_path()), contents).unwrap();
        }

        fn read_live(&self, file: TrackedFile) -> String {
            fs::read_to_string(self.container_root.join(file.container_path())).unwrap()
        }

        fn backup_root(&self) -> &Path {
            self.settings.paths.backup_root()
        }

        fn add_set(&self, name: &str, age_days: u64) -> PathBuf {
            let dir = self.backup_root().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("wg0.conf"), format!("# {}\n", name)).unwrap();
            let modified = SystemTime::now() - Duration::from_secs(age_days * 86_400);
            File::open(&dir).unwrap().set_modified(modified).unwrap();
            dir
        }
    }

    #[test]
    fn test_create_backup_snapshots_syncs_and_prunes() {
        let env = TestEnv::new();
        env.write_live(TrackedFile::WgConf, "[Interface]\n\n[Peer]\n");
        env.write_live(TrackedFile::ClientsTable, "[]");
        let expired = env.add_set("20200101_000000", 60);
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let report = manager.create_backup_named("20240615_123456").unwrap();

        assert!(report.is_complete());
        assert_eq!(
            fs::read_to_string(report.set_dir.join("wg0.conf")).unwrap(),
            "[Interface]\n\n[Peer]\n"
        );
        assert!(matches!(report.sync, Some(SyncOutcome::Synced(_))));
        assert!(env
            .settings
            .paths
            .mirror_root()
            .join("20240615_123456")
            .join("clientsTable")
            .exists());
        assert_eq!(report.pruned, vec![expired.clone()]);
        assert!(!expired.exists());
    }

    #[test]
    fn test_incomplete_backup_skips_sync_and_prune() {
        let env = TestEnv::new();
        env.write_live(TrackedFile::WgConf, "[Interface]\n");
        let expired = env.add_set("20200101_000000", 60);
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let report = manager.create_backup_named("20240615_123456").unwrap();

        assert!(!report.is_complete());
        assert!(report.sync.is_none());
        assert!(expired.exists());
        assert!(report.set_dir.join("wg0.conf").exists());
        assert!(!report.set_dir.join("clientsTable").exists());
    }

    #[test]
    fn test_create_backup_with_unresolved_container() {
        let env = TestEnv::new();
        let live = LivePaths::unresolved("Container named amnezia-awg not found.");
        let manager = BackupManager::new(&env.settings, &live);

        let report = manager.create_backup_named("20240615_123456").unwrap();

        assert!(!report.is_complete());
        assert!(report
            .snapshots
            .iter()
            .all(|(_, outcome)| matches!(outcome, SnapshotOutcome::NotFound(_))));
    }

    #[test]
    fn test_list_backups_orders_by_mtime() {
        let env = TestEnv::new();
        // Names deliberately out of order relative to their ages
        env.add_set("20240603_000000", 10);
        env.add_set("20240601_000000", 2);
        env.add_set("20240602_000000", 5);
        fs::write(env.backup_root().join("notes.txt"), "ignored").unwrap();
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let backups = manager.list_backups().unwrap();

        let names: Vec<&str> = backups.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["20240603_000000", "20240601_000000", "20240602_000000"]);
        assert_eq!(backups[0].files, vec![TrackedFile::WgConf]);
        assert!(backups[0].size_bytes > 0);
    }

    #[test]
    fn test_choose_backup_defaults_to_latest() {
        let env = TestEnv::new();
        env.add_set("20240601_000000", 3);
        env.add_set("20240602_000000", 2);
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);
        let backups = manager.list_backups().unwrap();

        let mut selector = PromptSelector::new(Cursor::new("\n"), Vec::new());
        let chosen = manager.choose_backup(&backups, &mut selector).unwrap();
        assert_eq!(chosen.name, "20240602_000000");

        let mut selector = PromptSelector::new(Cursor::new("1\n"), Vec::new());
        let chosen = manager.choose_backup(&backups, &mut selector).unwrap();
        assert_eq!(chosen.name, "20240601_000000");
    }

    #[test]
    fn test_choose_backup_rejects_out_of_range() {
        let env = TestEnv::new();
        env.add_set("20240601_000000", 1);
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);
        let backups = manager.list_backups().unwrap();

        for answer in ["0\n", "2\n", "abc\n"] {
            let mut selector = PromptSelector::new(Cursor::new(answer), Vec::new());
            let err = manager.choose_backup(&backups, &mut selector).unwrap_err();
            assert!(matches!(err, BackupError::InvalidSelection(_)));
        }
    }

    #[test]
    fn test_restore_round_trip() {
        let env = TestEnv::new();
        env.write_live(TrackedFile::WgConf, "[Interface]\n\n[Peer]\n\n[Peer]\n");
        env.write_live(TrackedFile::ClientsTable, r#"[{"clientId": "a"}]"#);
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);
        manager.create_backup_named("20240615_123456").unwrap();

        env.write_live(TrackedFile::WgConf, "[Interface]\n");

        let results = manager.restore("20240615_123456").unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0].outcome,
            Ok(RestoreOutcome::Restored(RestoreReason::Replaced { .. }))
        ));
        assert!(matches!(results[1].outcome, Ok(RestoreOutcome::Skipped(_))));
        assert_eq!(
            env.read_live(TrackedFile::WgConf),
            "[Interface]\n\n[Peer]\n\n[Peer]\n"
        );
    }

    #[test]
    fn test_restore_unknown_set_reports_not_found_per_file() {
        let env = TestEnv::new();
        env.write_live(TrackedFile::WgConf, "[Interface]\n");
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let results = manager.restore("20991231_235959").unwrap();

        assert!(results
            .iter()
            .all(|r| matches!(r.outcome, Ok(RestoreOutcome::NotFound))));
        assert_eq!(env.read_live(TrackedFile::WgConf), "[Interface]\n");
    }

    #[test]
    fn test_restore_rejects_path_like_names() {
        let env = TestEnv::new();
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let err = manager.restore("../nas").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_sync_with_empty_roots() {
        let env = TestEnv::new();
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let outcome = manager.sync().unwrap();

        assert_eq!(outcome, SyncOutcome::Synced(SyncReport::default()));
    }

    #[test]
    fn test_failed_file_does_not_stop_the_other() {
        let env = TestEnv::new();
        env.write_live(TrackedFile::WgConf, "[Interface]\n");
        env.write_live(TrackedFile::ClientsTable, "[]");
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);
        manager.create_backup_named("20240615_123456").unwrap();

        // A directory where wg0.conf should be cannot be overwritten
        let wg_conf = env.container_root.join(TrackedFile::WgConf.container_path());
        fs::remove_file(&wg_conf).unwrap();
        fs::create_dir(&wg_conf).unwrap();
        fs::write(wg_conf.join("stray"), "x").unwrap();
        env.write_live(TrackedFile::ClientsTable, "");

        let results = manager.restore("20240615_123456").unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].outcome.is_err());
        assert!(matches!(
            results[1].outcome,
            Ok(RestoreOutcome::Restored(RestoreReason::ReplacedEmpty))
        ));
        assert_eq!(env.read_live(TrackedFile::ClientsTable), "[]");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_set_is_listed_and_restorable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let env = TestEnv::new();
        let set = env.backup_root().join(OsStr::from_bytes(b"set\xff"));
        fs::create_dir(&set).unwrap();
        fs::write(set.join("wg0.conf"), "[Interface]\n\n[Peer]\n").unwrap();
        let live = env.live();
        let manager = BackupManager::new(&env.settings, &live);

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].path, set);

        let results = manager.restore_from(&backups[0].path);

        assert!(matches!(
            results[0].outcome,
            Ok(RestoreOutcome::Restored(RestoreReason::CreatedNew))
        ));
        assert_eq!(env.read_live(TrackedFile::WgConf), "[Interface]\n\n[Peer]\n");
    }
}
