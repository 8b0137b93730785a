//! File I/O utilities
//!
//! Metadata-preserving copies, byte comparison, writability probing and
//! atomic JSON writes. All errors name the path they happened on.

use std::fs::{self, File, FileTimes};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{BackupError, BackupResult};

/// Copy a file, keeping its permission bits and access/modification times
pub fn copy_with_metadata(src: &Path, dst: &Path) -> BackupResult<()> {
    // fs::copy carries the permission bits over
    fs::copy(src, dst).map_err(|e| BackupError::io("copy", src, e))?;
    copy_times(src, dst)
}

/// Give `dst` the access and modification times of `src`
fn copy_times(src: &Path, dst: &Path) -> BackupResult<()> {
    let metadata = fs::metadata(src).map_err(|e| BackupError::io("read metadata of", src, e))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    // Read-only handle; directories cannot be opened for writing
    File::open(dst)
        .and_then(|file| file.set_times(times))
        .map_err(|e| BackupError::io("set times on", dst, e))
}

/// Recursively copy a file or directory tree to a path that does not exist yet
///
/// Directories get the permission bits and times of their source.
pub fn copy_tree(src: &Path, dst: &Path) -> BackupResult<()> {
    let src_meta = fs::metadata(src).map_err(|e| BackupError::io("read metadata of", src, e))?;
    if !src_meta.is_dir() {
        return copy_with_metadata(src, dst);
    }

    let mut copied_dirs = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| BackupError::Io(format!("Failed to walk {}: {}", src.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BackupError::Io(format!("Failed to walk {}: {}", src.display(), e)))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BackupError::io("create directory", &target, e))?;
            copied_dirs.push((entry.path().to_path_buf(), target));
        } else {
            copy_with_metadata(entry.path(), &target)?;
        }
    }

    // Deepest first, once every child is in place
    for (dir_src, dir_dst) in copied_dirs.iter().rev() {
        copy_times(dir_src, dir_dst)?;
        let permissions = fs::metadata(dir_src)
            .map_err(|e| BackupError::io("read metadata of", dir_src, e))?
            .permissions();
        fs::set_permissions(dir_dst, permissions)
            .map_err(|e| BackupError::io("set permissions on", dir_dst, e))?;
    }

    Ok(())
}

/// Remove a file or an entire directory tree
pub fn remove_entry(path: &Path) -> BackupResult<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| BackupError::io("inspect", path, e))?;

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| BackupError::io("delete", path, e))
    } else {
        fs::remove_file(path).map_err(|e| BackupError::io("delete", path, e))
    }
}

/// Compare two files byte for byte
pub fn files_identical(a: &Path, b: &Path) -> BackupResult<bool> {
    let meta_a = fs::metadata(a).map_err(|e| BackupError::io("read metadata of", a, e))?;
    let meta_b = fs::metadata(b).map_err(|e| BackupError::io("read metadata of", b, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(File::open(a).map_err(|e| BackupError::io("open", a, e))?);
    let mut reader_b = BufReader::new(File::open(b).map_err(|e| BackupError::io("open", b, e))?);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];

    loop {
        let read_a = read_full(&mut reader_a, &mut buf_a).map_err(|e| BackupError::io("read", a, e))?;
        let read_b = read_full(&mut reader_b, &mut buf_b).map_err(|e| BackupError::io("read", b, e))?;

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns the byte count
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Check that `dir` is an existing directory we can create files in
///
/// Probes with a temporary file that is removed again straight away.
pub fn is_writable_dir(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }

    tempfile::Builder::new()
        .prefix(".awg-backup-probe")
        .tempfile_in(dir)
        .is_ok()
}

/// Write JSON to a file atomically (write to `<name>.tmp`, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> BackupResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file_name = path
        .file_name()
        .ok_or_else(|| BackupError::Io(format!("Not a file path: {}", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let file = File::create(&temp_path).map_err(|e| BackupError::io("create", &temp_path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| BackupError::Json(format!("Failed to serialize {}: {}", path.display(), e)))?;

    writer
        .flush()
        .map_err(|e| BackupError::io("flush", &temp_path, e))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| BackupError::io("sync", &temp_path, e))?;

    // Keep the permissions of the file being replaced
    if let Ok(existing) = fs::metadata(path) {
        fs::set_permissions(&temp_path, existing.permissions())
            .map_err(|e| BackupError::io("set permissions on", &temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        BackupError::io("replace", path, e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::open(path).unwrap().set_modified(time).unwrap();
    }

    #[test]
    fn test_copy_with_metadata_keeps_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("wg0.conf");
        let dst = temp_dir.path().join("copy.conf");
        fs::write(&src, "[Interface]\n").unwrap();
        let old = SystemTime::now() - Duration::from_secs(3 * 86_400);
        set_mtime(&src, old);

        copy_with_metadata(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"[Interface]\n");
        assert_eq!(
            fs::metadata(&dst).unwrap().modified().unwrap(),
            fs::metadata(&src).unwrap().modified().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_with_metadata_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("wg0.conf");
        let dst = temp_dir.path().join("copy.conf");
        fs::write(&src, "secret").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o600)).unwrap();

        copy_with_metadata(&src, &dst).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_copy_tree_copies_nested_entries() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("20240101_000000");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("wg0.conf"), "a").unwrap();
        fs::write(src.join("nested").join("clientsTable"), "[]").unwrap();
        let old = SystemTime::now() - Duration::from_secs(10 * 86_400);
        set_mtime(&src, old);

        let dst = temp_dir.path().join("mirror").join("20240101_000000");
        fs::create_dir(temp_dir.path().join("mirror")).unwrap();
        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("wg0.conf")).unwrap(), "a");
        assert_eq!(
            fs::read_to_string(dst.join("nested").join("clientsTable")).unwrap(),
            "[]"
        );
        assert_eq!(
            fs::metadata(&dst).unwrap().modified().unwrap(),
            fs::metadata(&src).unwrap().modified().unwrap()
        );
    }

    #[test]
    fn test_remove_entry_handles_files_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("stray.txt");
        let dir = temp_dir.path().join("20240101_000000");
        fs::write(&file, "x").unwrap();
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("wg0.conf"), "x").unwrap();

        remove_entry(&file).unwrap();
        remove_entry(&dir).unwrap();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_files_identical() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        let c = temp_dir.path().join("c");
        fs::write(&a, "[Peer]\nPublicKey = x\n").unwrap();
        fs::write(&b, "[Peer]\nPublicKey = x\n").unwrap();
        fs::write(&c, "[Peer]\nPublicKey = y\n").unwrap();

        assert!(files_identical(&a, &b).unwrap());
        assert!(!files_identical(&a, &c).unwrap());
    }

    #[test]
    fn test_is_writable_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(is_writable_dir(temp_dir.path()));
        assert!(!is_writable_dir(&temp_dir.path().join("missing")));

        // Probe leaves nothing behind
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_json_atomic_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clientsTable");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("clientsTable.tmp").exists());
        let loaded: TestData = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, data);
    }
}
