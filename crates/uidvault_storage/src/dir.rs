//! Directory-backed key-value backend for persistent storage.
//!
//! Layout:
//!
//! ```text
//! <dir>/
//! ├─ LOCK              # Advisory lock for single-writer
//! ├─ <key>.kv          # One framed value per key
//! └─ <key>.kv.tmp      # Transient, only during a write
//! ```
//!
//! Each value file is framed as
//! `magic (4) | length u32 LE | crc32 u32 LE | value bytes`, so that a torn or
//! damaged file is reported as [`StorageError::Corrupted`] instead of being
//! returned as data.

use crate::backend::KvBackend;
use crate::checksum::compute_crc32;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Magic bytes at the start of every value file.
const VALUE_MAGIC: [u8; 4] = *b"UVKV";
/// Size of the frame header preceding the value bytes.
const FRAME_HEADER_SIZE: usize = 12;
/// Extension of committed value files.
const VALUE_EXT: &str = ".kv";
/// Extension of in-flight value files.
const TEMP_EXT: &str = ".kv.tmp";
const LOCK_FILE: &str = "LOCK";
/// Longest key accepted, so file names stay portable.
const MAX_FILE_KEY_LEN: usize = 200;

/// A directory-backed key-value backend.
///
/// Every key is stored as its own file. Writes go to a temporary file that is
/// synced and then renamed over the previous value, so a crash leaves either
/// the old or the new value in place, never a mix.
///
/// # Durability
///
/// Every `set` and `delete` is synced (file and directory) before returning.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. The
/// directory is locked exclusively for the lifetime of the handle, so a second
/// handle on the same directory fails with [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use uidvault_storage::{KvBackend, DirKvBackend};
/// use std::path::Path;
///
/// let backend = DirKvBackend::open(Path::new("vault")).unwrap();
/// backend.init().unwrap();
/// backend.set("ts_0000000000000001_d", b"persistent data").unwrap();
/// ```
#[derive(Debug)]
pub struct DirKvBackend {
    path: PathBuf,
    /// Serializes writers so temp file names never collide.
    write_lock: RwLock<()>,
    _lock_file: File,
}

impl DirKvBackend {
    /// Opens or creates a backend rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists and is not a directory
    /// - Another handle holds the lock (returns [`StorageError::Locked`])
    /// - I/O errors occur
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a directory: {}", path.display()),
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            write_lock: RwLock::new(()),
            _lock_file: lock_file,
        })
    }

    /// Returns the root directory of the backend.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn value_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.path.join(format!("{key}{VALUE_EXT}")))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.path.join(format!("{key}{TEMP_EXT}"))
    }

    fn read_frame(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.value_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::not_found(key));
            }
            Err(e) => return Err(e.into()),
        };
        decode_frame(key, bytes)
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        File::open(&self.path)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl KvBackend for DirKvBackend {
    /// Removes temporary files left behind by an interrupted write.
    fn init(&self) -> StorageResult<()> {
        let _guard = self.write_lock.write();
        let mut removed = 0usize;
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(TEMP_EXT) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::warn!(removed, path = %self.path.display(), "discarded interrupted writes");
            self.sync_directory()?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let _guard = self.write_lock.read();
        self.read_frame(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.value_path(key)?;
        let temp_path = self.temp_path(key);
        let len = u32::try_from(value.len()).map_err(|_| StorageError::OutOfSpace {
            needed: value.len() as u64,
            available: u64::from(u32::MAX),
        })?;

        let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + value.len());
        frame.extend_from_slice(&VALUE_MAGIC);
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&compute_crc32(value).to_le_bytes());
        frame.extend_from_slice(value);

        let _guard = self.write_lock.write();

        if let Err(e) = replace_file(&temp_path, &path, &frame) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        self.sync_directory()
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.value_path(key)?;
        let _guard = self.write_lock.write();
        match fs::remove_file(&path) {
            Ok(()) => self.sync_directory(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::not_found(key)),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let _guard = self.write_lock.read();
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(key) = name.strip_suffix(VALUE_EXT) {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }

    fn sync(&self) -> StorageResult<()> {
        let _guard = self.write_lock.write();
        self.sync_directory()
    }
}

/// Keys become file names, so only a conservative character set is accepted.
/// Writes `contents` to `temp_path`, syncs it and renames it over `path`.
fn replace_file(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp_path, path)
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key(key, "empty key"));
    }
    if key.len() > MAX_FILE_KEY_LEN {
        return Err(StorageError::invalid_key(key, "key too long"));
    }
    if key.starts_with('.') {
        return Err(StorageError::invalid_key(key, "key starts with '.'"));
    }
    if key.eq_ignore_ascii_case(LOCK_FILE) {
        return Err(StorageError::invalid_key(key, "reserved name"));
    }
    if !key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
    {
        return Err(StorageError::invalid_key(key, "unsupported character"));
    }
    Ok(())
}

fn decode_frame(key: &str, mut bytes: Vec<u8>) -> StorageResult<Vec<u8>> {
    if bytes.len() < FRAME_HEADER_SIZE {
        return Err(StorageError::Corrupted(format!(
            "value file for {key} is truncated ({} bytes)",
            bytes.len()
        )));
    }
    if bytes[..4] != VALUE_MAGIC {
        return Err(StorageError::Corrupted(format!(
            "value file for {key} has bad magic"
        )));
    }

    let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let actual_len = bytes.len() - FRAME_HEADER_SIZE;
    if len != actual_len {
        return Err(StorageError::Corrupted(format!(
            "value file for {key} holds {actual_len} bytes, header says {len}"
        )));
    }

    let value = bytes.split_off(FRAME_HEADER_SIZE);
    let actual_crc = compute_crc32(&value);
    if actual_crc != crc {
        return Err(StorageError::Corrupted(format!(
            "checksum mismatch for {key}: expected {crc:08x}, got {actual_crc:08x}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dir_create_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault");

        let backend = DirKvBackend::open(&path).unwrap();
        assert!(path.is_dir());
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn dir_set_and_get() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();

        backend.set("ts_00000000000000ff_d", b"hello world").unwrap();
        assert_eq!(backend.get("ts_00000000000000ff_d").unwrap(), b"hello world");
        assert_eq!(backend.value_len("ts_00000000000000ff_d").unwrap(), 11);
    }

    #[test]
    fn dir_overwrite_truncates() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();

        backend.set("k", b"a much longer value").unwrap();
        backend.set("k", b"tiny").unwrap();
        assert_eq!(backend.get("k").unwrap(), b"tiny");
    }

    #[test]
    fn dir_persistence() {
        let dir = tempdir().unwrap();
        {
            let backend = DirKvBackend::open(dir.path()).unwrap();
            backend.set("k", b"persistent").unwrap();
        }
        let backend = DirKvBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get("k").unwrap(), b"persistent");
    }

    #[test]
    fn dir_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _first = DirKvBackend::open(dir.path()).unwrap();
        let second = DirKvBackend::open(dir.path());
        assert!(matches!(second, Err(StorageError::Locked)));
    }

    #[test]
    fn dir_missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        assert!(backend.get("nope").unwrap_err().is_not_found());
        assert!(backend.delete("nope").unwrap_err().is_not_found());
        assert!(!backend.contains("nope").unwrap());
    }

    #[test]
    fn dir_delete() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        backend.set("k", b"v").unwrap();
        backend.delete("k").unwrap();
        assert!(backend.get("k").unwrap_err().is_not_found());
        assert!(!dir.path().join("k.kv").exists());
    }

    #[test]
    fn dir_bit_flip_is_corruption() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        backend.set("k", b"some value").unwrap();

        let file = dir.path().join("k.kv");
        let mut raw = fs::read(&file).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        fs::write(&file, raw).unwrap();

        assert!(matches!(backend.get("k"), Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn dir_truncated_file_is_corruption() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        backend.set("k", b"some value").unwrap();

        let file = dir.path().join("k.kv");
        let raw = fs::read(&file).unwrap();
        fs::write(&file, &raw[..raw.len() - 3]).unwrap();

        assert!(matches!(backend.get("k"), Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn dir_rejects_unsafe_keys() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        for key in ["", "../escape", "a/b", ".hidden", "LOCK", "sp ace"] {
            let result = backend.set(key, b"x");
            assert!(
                matches!(result, Err(StorageError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn dir_keys_ignores_lock_and_temp_files() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        backend.set("a", b"1").unwrap();
        fs::write(dir.path().join("b.kv.tmp"), b"partial").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn dir_init_discards_interrupted_writes() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        backend.set("a", b"committed").unwrap();
        fs::write(dir.path().join("a.kv.tmp"), b"torn").unwrap();

        backend.init().unwrap();
        assert!(!dir.path().join("a.kv.tmp").exists());
        assert_eq!(backend.get("a").unwrap(), b"committed");
    }

    #[test]
    fn dir_failed_set_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let backend = DirKvBackend::open(dir.path()).unwrap();
        let blocker = dir.path().join("a.kv");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("inner"), b"x").unwrap();

        assert!(backend.set("a", b"value").is_err());
        assert!(!dir.path().join("a.kv.tmp").exists());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn stored_values_read_back(
                key in "k[a-z0-9_]{0,30}",
                value in prop::collection::vec(any::<u8>(), 0..512),
            ) {
                let dir = tempdir().unwrap();
                let backend = DirKvBackend::open(dir.path()).unwrap();
                backend.set(&key, &value).unwrap();
                prop_assert_eq!(backend.get(&key).unwrap(), value);
            }
        }
    }
}
