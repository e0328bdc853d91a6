//! In-memory key-value backend for testing.

use crate::backend::KvBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory key-value backend.
///
/// This backend stores all values in a map and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// An optional byte capacity makes writes fail with
/// [`StorageError::OutOfSpace`] once the sum of stored value lengths would
/// exceed it.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use uidvault_storage::{KvBackend, InMemoryKvBackend};
///
/// let backend = InMemoryKvBackend::new();
/// backend.set("k", b"test data").unwrap();
/// assert_eq!(backend.value_len("k").unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryKvBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    capacity: Option<u64>,
}

impl InMemoryKvBackend {
    /// Creates a new empty in-memory backend with unbounded capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend that holds at most `capacity` value bytes.
    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the total number of value bytes stored.
    #[must_use]
    pub fn used_bytes(&self) -> u64 {
        self.entries.read().values().map(|v| v.len() as u64).sum()
    }

    /// Replaces the raw value under `key` without any checks.
    ///
    /// Useful for testing tamper and corruption scenarios.
    pub fn put_raw(&self, key: &str, value: Vec<u8>) {
        self.entries.write().insert(key.to_string(), value);
    }
}

impl KvBackend for InMemoryKvBackend {
    fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn value_len(&self, key: &str) -> StorageResult<usize> {
        self.entries
            .read()
            .get(key)
            .map(Vec::len)
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::invalid_key(key, "empty key"));
        }

        let mut entries = self.entries.write();
        if let Some(capacity) = self.capacity {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len() as u64)
                .sum();
            let available = capacity.saturating_sub(others);
            if value.len() as u64 > available {
                return Err(StorageError::OutOfSpace {
                    needed: value.len() as u64,
                    available,
                });
            }
        }

        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn sync(&self) -> StorageResult<()> {
        // Nothing is buffered
        Ok(())
    }
}
