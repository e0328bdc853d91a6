//! Single-object commands: put, get, info, remove, purge.

use super::{load_key, open_store, CliResult};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use uidvault_core::{AeadAlgorithm, CreateFlags, Uid};

/// Object metadata as printed by `info`.
#[derive(Debug, Serialize)]
pub struct InfoOutput {
    /// UID in hex.
    pub uid: String,
    /// Plaintext size in bytes.
    pub size: usize,
    /// Stored size in bytes.
    pub stored_size: usize,
    /// Whether the object is write-once.
    pub write_once: bool,
}

/// Encrypts `file` into the store under `uid`.
pub fn put(
    dir: &Path,
    key_file: &Path,
    algorithm: AeadAlgorithm,
    uid: Uid,
    file: &Path,
    write_once: bool,
    aad: &[u8],
) -> CliResult<()> {
    let key = load_key(key_file)?;
    let store = open_store(dir, algorithm)?;
    let plaintext = std::fs::read(file)?;
    let flags = if write_once {
        CreateFlags::WRITE_ONCE
    } else {
        CreateFlags::NONE
    };

    store.put_with_flags(uid, &key, &plaintext, aad, flags)?;
    println!("Stored {} bytes under {uid}", plaintext.len());
    Ok(())
}

/// Decrypts the object under `uid` into `out`, or stdout.
pub fn get(
    dir: &Path,
    key_file: &Path,
    algorithm: AeadAlgorithm,
    uid: Uid,
    out: Option<&Path>,
    aad: &[u8],
) -> CliResult<()> {
    let key = load_key(key_file)?;
    let store = open_store(dir, algorithm)?;
    let plaintext = store.get(uid, &key, aad)?;

    match out {
        Some(path) => std::fs::write(path, &plaintext)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&plaintext)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Prints the metadata of the object under `uid`.
pub fn info(dir: &Path, algorithm: AeadAlgorithm, uid: Uid, format: &str) -> CliResult<()> {
    let store = open_store(dir, algorithm)?;
    let info = store.get_info(uid)?;
    let output = InfoOutput {
        uid: uid.to_string(),
        size: info.size,
        stored_size: store.size_of(info.size),
        write_once: info.flags.is_write_once(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&output)?),
        _ => {
            println!("UID:         {}", output.uid);
            println!("Size:        {} bytes", output.size);
            println!("Stored size: {} bytes", output.stored_size);
            println!("Write-once:  {}", output.write_once);
        }
    }
    Ok(())
}

/// Removes the object under `uid`.
pub fn remove(dir: &Path, algorithm: AeadAlgorithm, uid: Uid) -> CliResult<()> {
    let store = open_store(dir, algorithm)?;
    store.remove(uid)?;
    println!("Removed {uid}");
    Ok(())
}

/// Removes the object under `uid` unless it authenticates as write-once.
pub fn purge(
    dir: &Path,
    key_file: &Path,
    algorithm: AeadAlgorithm,
    uid: Uid,
    aad: &[u8],
) -> CliResult<()> {
    let key = load_key(key_file)?;
    let store = open_store(dir, algorithm)?;
    store.purge(uid, &key, aad)?;
    println!("Purged {uid}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_through_files() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("store");
        let key_file = temp.path().join("key.hex");
        let input = temp.path().join("in.bin");
        let output = temp.path().join("out.bin");
        std::fs::write(&key_file, "11".repeat(32)).unwrap();
        std::fs::write(&input, b"file contents").unwrap();

        let alg = AeadAlgorithm::Aes256Gcm;
        put(&dir, &key_file, alg, Uid::new(1), &input, false, b"").unwrap();
        get(&dir, &key_file, alg, Uid::new(1), Some(&output), b"").unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"file contents");

        info(&dir, alg, Uid::new(1), "json").unwrap();
        remove(&dir, alg, Uid::new(1)).unwrap();
        assert!(remove(&dir, alg, Uid::new(1)).is_err());
    }

    #[test]
    fn purge_respects_authentic_write_once() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("store");
        let key_file = temp.path().join("key.hex");
        let other_key = temp.path().join("other.hex");
        let input = temp.path().join("in.bin");
        std::fs::write(&key_file, "22".repeat(32)).unwrap();
        std::fs::write(&other_key, "33".repeat(32)).unwrap();
        std::fs::write(&input, b"pinned").unwrap();

        let alg = AeadAlgorithm::Aes256Gcm;
        put(&dir, &key_file, alg, Uid::new(7), &input, true, b"").unwrap();
        assert!(remove(&dir, alg, Uid::new(7)).is_err());
        assert!(purge(&dir, &key_file, alg, Uid::new(7), b"").is_err());

        purge(&dir, &other_key, alg, Uid::new(7), b"").unwrap();
        assert!(info(&dir, alg, Uid::new(7), "text").is_err());
    }
}
