//! CLI command implementations.

pub mod keygen;
pub mod list;
pub mod object;
pub mod verify;

use std::path::Path;
use std::sync::Arc;
use uidvault_core::{AeadAlgorithm, EncryptionKey, SecureObjectStore, StoreConfig, Uid};
use uidvault_storage::DirKvBackend;
use zeroize::Zeroizing;

/// Boxed error returned by every command.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Parses a UID given in decimal or `0x`-prefixed hex.
pub fn parse_uid(text: &str) -> CliResult<Uid> {
    let text = text.trim();
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse::<u64>(),
    };
    value
        .map(Uid::new)
        .map_err(|e| format!("invalid UID {text:?}: {e}").into())
}

/// Reads a hex-encoded key from `path`.
pub fn load_key(path: &Path) -> CliResult<EncryptionKey> {
    let text = Zeroizing::new(std::fs::read_to_string(path)?);
    let bytes = Zeroizing::new(
        hex::decode(text.trim())
            .map_err(|e| format!("key file {} is not hex: {e}", path.display()))?,
    );
    Ok(EncryptionKey::from_bytes(&bytes)?)
}

/// Opens and initializes the store rooted at `dir`.
pub fn open_store(dir: &Path, algorithm: AeadAlgorithm) -> CliResult<SecureObjectStore> {
    tracing::debug!(dir = %dir.display(), %algorithm, "opening store");
    let backend = DirKvBackend::open(dir)?;
    let store = SecureObjectStore::new(StoreConfig::new().algorithm(algorithm), Arc::new(backend))?;
    store.initialize()?;
    Ok(store)
}
