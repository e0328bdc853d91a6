//! Verify command implementation.

use super::{load_key, open_store, CliResult};
use std::path::Path;
use uidvault_core::{AeadAlgorithm, RecordState, StoreError};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of UIDs checked.
    pub records_checked: usize,
    /// Number of records that passed every check.
    pub valid_records: usize,
    /// UIDs with data but no info entry.
    pub orphans: usize,
    /// Number of damaged or incomplete records.
    pub corrupt_records: usize,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.orphans == 0 && self.corrupt_records == 0 && self.errors.is_empty()
    }
}

/// Runs the verify command.
///
/// Without a key only the info records are checked. With a key every
/// object is decrypted and authenticated using `aad`.
pub fn run(
    dir: &Path,
    algorithm: AeadAlgorithm,
    key_file: Option<&Path>,
    aad: &[u8],
) -> CliResult<()> {
    println!("Verifying store at {}", dir.display());
    println!();

    let key = key_file.map(load_key).transpose()?;
    let store = open_store(dir, algorithm)?;
    let mut result = VerifyResult::default();

    for (uid, state) in store.record_states()? {
        result.records_checked += 1;
        match state {
            RecordState::OrphanData => {
                result.orphans += 1;
                result.errors.push(format!("{uid}: data without info (orphan)"));
                continue;
            }
            RecordState::MissingData => {
                result.corrupt_records += 1;
                result.errors.push(format!("{uid}: info without data"));
                continue;
            }
            RecordState::Complete => {}
        }

        let checked = match &key {
            Some(key) => store.get(uid, key, aad).map(|_| ()),
            None => store.get_info(uid).map(|_| ()),
        };
        match checked {
            Ok(()) => result.valid_records += 1,
            Err(e @ StoreError::DataCorrupt { .. }) => {
                result.corrupt_records += 1;
                result.errors.push(format!("{uid}: {e}"));
            }
            Err(e) => return Err(e.into()),
        }
    }

    print_result(&result);
    println!();
    if result.is_ok() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!("✗ Store verification failed");
        Err("Verification failed".into())
    }
}

fn print_result(result: &VerifyResult) {
    println!("  Records checked: {}", result.records_checked);
    println!("  Valid records:   {}", result.valid_records);
    println!("  Orphans:         {}", result.orphans);
    println!("  Corrupt records: {}", result.corrupt_records);

    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in result.errors.iter().take(10) {
            println!("    - {error}");
        }
        if result.errors.len() > 10 {
            println!("    ... and {} more", result.errors.len() - 10);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uidvault_core::{derive_key, EncryptionKey, SecureObjectStore, StoreConfig, Uid};
    use uidvault_storage::{DirKvBackend, KvBackend};

    #[test]
    fn clean_store_passes_and_orphan_fails() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("store");
        let key = EncryptionKey::generate();

        {
            let kv = Arc::new(DirKvBackend::open(&dir).unwrap());
            let store = SecureObjectStore::new(StoreConfig::default(), kv.clone()).unwrap();
            store.initialize().unwrap();
            store.put(Uid::new(1), &key, b"one", b"").unwrap();
            store.put(Uid::new(2), &key, b"two", b"").unwrap();
        }
        run(&dir, AeadAlgorithm::Aes256Gcm, None, b"").unwrap();

        {
            let kv = DirKvBackend::open(&dir).unwrap();
            kv.delete(&derive_key("ts_", Uid::new(2), "_i").unwrap()).unwrap();
        }
        assert!(run(&dir, AeadAlgorithm::Aes256Gcm, None, b"").is_err());
    }
}
