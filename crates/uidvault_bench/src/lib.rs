//! Benchmark utilities.

use rand::Rng;
use std::sync::Arc;
use uidvault_core::{AeadAlgorithm, SecureObjectStore, StoreConfig, StoreResult, Uid};
use uidvault_storage::KvBackend;

/// Payload sizes shared by the benchmarks.
pub const SIZES: [usize; 4] = [64, 256, 1024, 4096];

/// Generate random data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a batch of random UIDs.
pub fn generate_uids(count: usize) -> Vec<Uid> {
    let mut rng = rand::thread_rng();
    (0..count).map(|_| Uid::new(rng.gen())).collect()
}

/// Opens an initialized store over `kv`.
///
/// # Errors
///
/// Returns an error if the store cannot be initialized.
pub fn open_store(
    kv: Arc<dyn KvBackend>,
    algorithm: AeadAlgorithm,
) -> StoreResult<SecureObjectStore> {
    let store = SecureObjectStore::new(StoreConfig::new().algorithm(algorithm), kv)?;
    store.initialize()?;
    Ok(store)
}
