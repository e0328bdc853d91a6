//! Backend fixtures.

use std::sync::Arc;
use tempfile::TempDir;
use uidvault_storage::{DirKvBackend, InMemoryKvBackend, KvBackend};

/// A directory backend inside a temporary directory that is removed on drop.
pub struct TempDirBackend {
    /// The backend instance.
    pub backend: Arc<DirKvBackend>,
    _temp_dir: TempDir,
}

impl TempDirBackend {
    /// Creates a backend in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = DirKvBackend::open(&temp_dir.path().join("store"))
            .expect("Failed to open directory backend");
        Self {
            backend: Arc::new(backend),
            _temp_dir: temp_dir,
        }
    }

    /// Returns the backend as a trait object.
    pub fn as_dyn(&self) -> Arc<dyn KvBackend> {
        self.backend.clone()
    }
}

impl Default for TempDirBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a fresh in-memory backend as a trait object.
pub fn memory_backend() -> Arc<dyn KvBackend> {
    Arc::new(InMemoryKvBackend::new())
}

/// Runs a test against every backend kind.
///
/// # Example
///
/// ```rust,ignore
/// use uidvault_testkit::for_each_backend;
///
/// for_each_backend(|backend| {
///     backend.set("k", b"v").unwrap();
/// });
/// ```
pub fn for_each_backend<F>(mut f: F)
where
    F: FnMut(Arc<dyn KvBackend>),
{
    f(memory_backend());
    let dir = TempDirBackend::new();
    f(dir.as_dyn());
}

/// Returns a payload of `len` bytes with a recognizable pattern.
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_backend_works() {
        let dir = TempDirBackend::new();
        dir.backend.set("key", b"value").unwrap();
        assert_eq!(dir.backend.get("key").unwrap(), b"value");
    }

    #[test]
    fn for_each_backend_visits_both() {
        let mut visited = 0;
        for_each_backend(|backend| {
            backend.set("k", b"v").unwrap();
            visited += 1;
        });
        assert_eq!(visited, 2);
    }

    #[test]
    fn patterned_bytes_len() {
        let bytes = patterned_bytes(300);
        assert_eq!(bytes.len(), 300);
        assert_eq!(bytes[251], 0);
    }
}
