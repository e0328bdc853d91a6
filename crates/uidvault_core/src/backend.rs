//! Object-level adapter over a key-value backend.
//!
//! Translates `(uid, prefix, suffix)` addressed requests into key-value
//! operations and maps substrate errors into the store taxonomy. Atomicity
//! is per key only; pairing two keys into one record is the store's job.

use crate::error::{StoreError, StoreResult};
use crate::key::derive_key;
use crate::types::Uid;
use std::sync::Arc;
use uidvault_storage::KvBackend;

/// Reads, writes and removes objects addressed by UID and namespace.
#[derive(Clone)]
pub struct ObjectBackend {
    kv: Arc<dyn KvBackend>,
}

impl ObjectBackend {
    /// Wraps a key-value backend.
    #[must_use]
    pub fn new(kv: Arc<dyn KvBackend>) -> Self {
        Self { kv }
    }

    /// Brings up the underlying backend.
    ///
    /// # Errors
    ///
    /// Returns the mapped backend error.
    pub fn initialize(&self) -> StoreResult<()> {
        self.kv.init().map_err(StoreError::from)
    }

    /// Fills `out` from the object stored under `(prefix, uid, suffix)`.
    ///
    /// Reads at most `out.len()` bytes and requires at least that many to be
    /// stored, so fixed-size records can be read without knowing whether
    /// the backend keeps trailing bytes.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty `out`, an empty prefix or suffix, a
    ///   key that is too long, or a stored object shorter than `out`
    /// - `DoesNotExist` if nothing is stored under the key
    /// - `DataCorrupt` if the backend reports damaged data
    /// - `StorageFailure` for any other backend error
    pub fn get_object(
        &self,
        uid: Uid,
        prefix: &str,
        suffix: &str,
        out: &mut [u8],
    ) -> StoreResult<()> {
        if out.is_empty() {
            return Err(StoreError::invalid_argument("read buffer is empty"));
        }
        let key = derive_key(prefix, uid, suffix)?;

        let value = self.kv.get(&key)?;
        if value.len() < out.len() {
            return Err(StoreError::invalid_argument(format!(
                "object {key} holds {} bytes, {} requested",
                value.len(),
                out.len()
            )));
        }

        out.copy_from_slice(&value[..out.len()]);
        Ok(())
    }

    /// Returns the stored length of the object under `(prefix, uid, suffix)`.
    ///
    /// # Errors
    ///
    /// Same as [`get_object`](Self::get_object), minus the buffer checks.
    pub fn get_object_len(&self, uid: Uid, prefix: &str, suffix: &str) -> StoreResult<usize> {
        let key = derive_key(prefix, uid, suffix)?;
        Ok(self.kv.value_len(&key)?)
    }

    /// Returns true if an object is stored under `(prefix, uid, suffix)`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid key parts or backend failures.
    pub fn contains_object(&self, uid: Uid, prefix: &str, suffix: &str) -> StoreResult<bool> {
        let key = derive_key(prefix, uid, suffix)?;
        Ok(self.kv.contains(&key)?)
    }

    /// Stores `data` under `(prefix, uid, suffix)`, replacing any previous
    /// value in full.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for empty `data`, an empty prefix or suffix, or a
    ///   key that is too long
    /// - `StorageFailure` if the backend write fails, out of space included
    pub fn set_object(
        &self,
        uid: Uid,
        prefix: &str,
        suffix: &str,
        data: &[u8],
    ) -> StoreResult<()> {
        if data.is_empty() {
            return Err(StoreError::invalid_argument("object data is empty"));
        }
        let key = derive_key(prefix, uid, suffix)?;
        Ok(self.kv.set(&key, data)?)
    }

    /// Removes the object stored under `(prefix, uid, suffix)`.
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` if nothing is stored under the key
    /// - `StorageFailure` if the deletion fails
    pub fn remove_object(&self, uid: Uid, prefix: &str, suffix: &str) -> StoreResult<()> {
        let key = derive_key(prefix, uid, suffix)?;
        Ok(self.kv.delete(&key)?)
    }

    /// Lists every key held by the backend.
    ///
    /// # Errors
    ///
    /// Returns the mapped backend error.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.kv.keys()?)
    }
}

impl std::fmt::Debug for ObjectBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBackend").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uidvault_storage::InMemoryKvBackend;

    const UID: Uid = Uid::new(0x0102_0304_0506_0708);

    fn adapter() -> (Arc<InMemoryKvBackend>, ObjectBackend) {
        let kv = Arc::new(InMemoryKvBackend::new());
        (kv.clone(), ObjectBackend::new(kv))
    }

    #[test]
    fn set_then_get_exact() {
        let (kv, backend) = adapter();
        backend.set_object(UID, "ts_", "_d", b"payload").unwrap();
        assert_eq!(kv.get("ts_0102030405060708_d").unwrap(), b"payload");

        let mut out = [0u8; 7];
        backend.get_object(UID, "ts_", "_d", &mut out).unwrap();
        assert_eq!(&out, b"payload");
    }

    #[test]
    fn get_reads_at_most_requested() {
        let (_, backend) = adapter();
        backend.set_object(UID, "ts_", "_d", b"payload-with-padding").unwrap();

        let mut out = [0u8; 7];
        backend.get_object(UID, "ts_", "_d", &mut out).unwrap();
        assert_eq!(&out, b"payload");
    }

    #[test]
    fn get_requires_at_least_requested() {
        let (_, backend) = adapter();
        backend.set_object(UID, "ts_", "_d", b"short").unwrap();

        let mut out = [0u8; 8];
        assert!(matches!(
            backend.get_object(UID, "ts_", "_d", &mut out),
            Err(StoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn get_missing_does_not_exist() {
        let (_, backend) = adapter();
        let mut out = [0u8; 1];
        assert!(matches!(
            backend.get_object(UID, "ts_", "_d", &mut out),
            Err(StoreError::DoesNotExist)
        ));
    }

    #[test]
    fn empty_buffers_rejected() {
        let (_, backend) = adapter();
        assert!(matches!(
            backend.set_object(UID, "ts_", "_d", b""),
            Err(StoreError::InvalidArgument { .. })
        ));
        let mut out = [0u8; 0];
        assert!(matches!(
            backend.get_object(UID, "ts_", "_d", &mut out),
            Err(StoreError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn key_bound_checked_before_backend() {
        let (kv, backend) = adapter();
        let long_prefix = "a_prefix_that_is_way_too_long_";
        assert!(matches!(
            backend.set_object(UID, long_prefix, "_d", b"x"),
            Err(StoreError::InvalidArgument { .. })
        ));
        assert!(kv.is_empty());
    }

    #[test]
    fn remove_reports_absence() {
        let (_, backend) = adapter();
        backend.set_object(UID, "ts_", "_d", b"x").unwrap();
        backend.remove_object(UID, "ts_", "_d").unwrap();
        assert!(matches!(
            backend.remove_object(UID, "ts_", "_d"),
            Err(StoreError::DoesNotExist)
        ));
        assert!(!backend.contains_object(UID, "ts_", "_d").unwrap());
    }

    #[test]
    fn out_of_space_is_storage_failure() {
        let kv = Arc::new(InMemoryKvBackend::with_capacity(4));
        let backend = ObjectBackend::new(kv);
        assert!(matches!(
            backend.set_object(UID, "ts_", "_d", b"too large"),
            Err(StoreError::StorageFailure { .. })
        ));
    }

    #[test]
    fn overwrite_replaces_length() {
        let (_, backend) = adapter();
        backend.set_object(UID, "ts_", "_d", b"longer value").unwrap();
        backend.set_object(UID, "ts_", "_d", b"tiny").unwrap();
        assert_eq!(backend.get_object_len(UID, "ts_", "_d").unwrap(), 4);
    }
}
