//! Fault injection for key-value backends.
//!
//! [`FaultyBackend`] wraps another backend and fails chosen operations so
//! tests can observe what callers leave behind when a write is interrupted.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uidvault_storage::{InMemoryKvBackend, KvBackend, StorageError, StorageResult};

/// A key-value backend wrapper that can simulate failures.
pub struct FaultyBackend {
    inner: Arc<dyn KvBackend>,
    fail_set_after: AtomicUsize,
    sets: AtomicUsize,
    fail_delete: AtomicBool,
    fail_init: AtomicBool,
    out_of_space: AtomicBool,
    failures: AtomicUsize,
}

impl FaultyBackend {
    /// Wraps an existing backend.
    pub fn new(inner: Arc<dyn KvBackend>) -> Self {
        Self {
            inner,
            fail_set_after: AtomicUsize::new(usize::MAX),
            sets: AtomicUsize::new(0),
            fail_delete: AtomicBool::new(false),
            fail_init: AtomicBool::new(false),
            out_of_space: AtomicBool::new(false),
            failures: AtomicUsize::new(0),
        }
    }

    /// Wraps a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryKvBackend::new()))
    }

    /// Returns the wrapped backend, bypassing fault injection.
    pub fn inner(&self) -> &Arc<dyn KvBackend> {
        &self.inner
    }

    /// Lets `count` more sets succeed, then fails every later set.
    pub fn fail_set_after(&self, count: usize) {
        self.sets.store(0, Ordering::SeqCst);
        self.fail_set_after.store(count, Ordering::SeqCst);
    }

    /// Makes failing sets report out-of-space instead of an I/O error.
    pub fn set_out_of_space(&self, enabled: bool) {
        self.out_of_space.store(enabled, Ordering::SeqCst);
    }

    /// Sets whether deletes should fail.
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Sets whether init should fail.
    pub fn set_fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// Flips one bit of the value stored under `key`, in place.
    ///
    /// # Panics
    ///
    /// Panics if `key` is absent or its value is shorter than `byte + 1`.
    pub fn corrupt(&self, key: &str, byte: usize) {
        let mut value = self.inner.get(key).expect("value to corrupt");
        value[byte] ^= 0x01;
        self.inner.set(key, &value).expect("rewrite corrupted value");
    }

    /// Resets all fault settings.
    pub fn reset(&self) {
        self.fail_set_after.store(usize::MAX, Ordering::SeqCst);
        self.sets.store(0, Ordering::SeqCst);
        self.fail_delete.store(false, Ordering::SeqCst);
        self.fail_init.store(false, Ordering::SeqCst);
        self.out_of_space.store(false, Ordering::SeqCst);
    }

    /// Returns how many operations were failed on purpose.
    pub fn injected_failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn injected(&self, what: &str) -> StorageError {
        self.failures.fetch_add(1, Ordering::SeqCst);
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("simulated failure during {what}"),
        ))
    }
}

impl KvBackend for FaultyBackend {
    fn init(&self) -> StorageResult<()> {
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(self.injected("init"));
        }
        self.inner.init()
    }

    fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(key)
    }

    fn value_len(&self, key: &str) -> StorageResult<usize> {
        self.inner.value_len(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let done = self.sets.fetch_add(1, Ordering::SeqCst);
        if done >= self.fail_set_after.load(Ordering::SeqCst) {
            if self.out_of_space.load(Ordering::SeqCst) {
                self.failures.fetch_add(1, Ordering::SeqCst);
                return Err(StorageError::OutOfSpace {
                    needed: value.len() as u64,
                    available: 0,
                });
            }
            return Err(self.injected("set"));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(self.injected("delete"));
        }
        self.inner.delete(key)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        self.inner.keys()
    }

    fn sync(&self) -> StorageResult<()> {
        self.inner.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_by_default() {
        let backend = FaultyBackend::in_memory();
        backend.set("a", b"1").unwrap();
        assert_eq!(backend.get("a").unwrap(), b"1");
        backend.delete("a").unwrap();
        assert_eq!(backend.injected_failures(), 0);
    }

    #[test]
    fn fails_sets_after_count() {
        let backend = FaultyBackend::in_memory();
        backend.fail_set_after(1);

        backend.set("a", b"1").unwrap();
        assert!(matches!(backend.set("b", b"2"), Err(StorageError::Io(_))));
        assert!(!backend.contains("b").unwrap());
        assert_eq!(backend.injected_failures(), 1);

        backend.reset();
        backend.set("b", b"2").unwrap();
    }

    #[test]
    fn out_of_space_mode() {
        let backend = FaultyBackend::in_memory();
        backend.set_out_of_space(true);
        backend.fail_set_after(0);
        assert!(matches!(
            backend.set("a", b"1"),
            Err(StorageError::OutOfSpace { .. })
        ));
    }

    #[test]
    fn failing_delete_and_init() {
        let backend = FaultyBackend::in_memory();
        backend.set("a", b"1").unwrap();
        backend.set_fail_delete(true);
        backend.set_fail_init(true);

        assert!(backend.delete("a").is_err());
        assert!(backend.init().is_err());
        assert!(backend.contains("a").unwrap());
    }

    #[test]
    fn corrupt_flips_one_bit() {
        let backend = FaultyBackend::in_memory();
        backend.set("a", &[0b1010]).unwrap();
        backend.corrupt("a", 0);
        assert_eq!(backend.get("a").unwrap(), vec![0b1011]);
    }
}
