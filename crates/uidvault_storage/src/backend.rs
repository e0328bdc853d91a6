//! Key-value backend trait definition.

use crate::error::{StorageError, StorageResult};

/// A key-value persistence substrate for uidvault.
///
/// Backends are **opaque key-value stores**. They map short textual keys to
/// byte values and offer get, set and delete by key. uidvault owns all value
/// format interpretation - backends do not understand ciphertexts or nonces.
///
/// # Invariants
///
/// - `set` replaces the entire previous value of the key (overwrite and truncate)
/// - `set` is atomic per key: a reader sees the old value or the new one
/// - `get` returns exactly the bytes of the last successful `set`
/// - `delete` of a missing key reports [`StorageError::NotFound`]
/// - No atomicity is offered across different keys
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryKvBackend`] - For testing
/// - [`super::DirKvBackend`] - For persistent storage
pub trait KvBackend: Send + Sync {
    /// Prepares the backend for use.
    ///
    /// Called once by the host before any other operation. The default does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be brought up.
    fn init(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Loads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No value exists ([`StorageError::NotFound`])
    /// - The backend detects that the stored value is damaged
    /// - An I/O error occurs
    fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Returns the length of the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    fn value_len(&self, key: &str) -> StorageResult<usize> {
        self.get(key).map(|value| value.len())
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not acceptable to the backend, the
    /// backend is out of space, or an I/O error occurs.
    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Deletes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no value exists, or another
    /// error if the deletion fails.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Returns true if a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than absence.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        match self.value_len(key) {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Lists every key currently stored, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the key listing cannot be read.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&self) -> StorageResult<()>;
}
