//! # uidvault Core
//!
//! Encrypted object store addressed by 64-bit UIDs.
//!
//! This crate provides:
//! - Key derivation from `(prefix, uid, suffix)` into bounded backend keys
//! - AEAD engines (AES-256-GCM, ChaCha20-Poly1305) and nonce sources
//! - An adapter that reads and writes objects on any [`KvBackend`]
//! - [`SecureObjectStore`], which pairs each ciphertext with an info record
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use uidvault_core::{EncryptionKey, SecureObjectStore, StoreConfig, Uid};
//! use uidvault_storage::InMemoryKvBackend;
//!
//! let store = SecureObjectStore::new(StoreConfig::default(), Arc::new(InMemoryKvBackend::new())).unwrap();
//! store.initialize().unwrap();
//!
//! let key = EncryptionKey::generate();
//! store.put(Uid::new(1), &key, b"value", b"aad").unwrap();
//! assert_eq!(store.get(Uid::new(1), &key, b"aad").unwrap(), b"value");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
pub mod crypto;
mod error;
mod key;
mod record;
mod store;
mod types;

pub use backend::ObjectBackend;
pub use config::{NonceStrategy, StoreConfig};
pub use crypto::{
    AeadAlgorithm, AeadEngine, Aes256GcmEngine, ChaCha20Poly1305Engine, CounterNonce,
    EncryptionKey, NonceSource, RandomNonce,
};
pub use error::{Status, StoreError, StoreResult};
pub use key::{derive_key, parse_key, MAX_KEY_LEN, UID_HEX_LEN};
pub use record::{InfoRecord, INFO_RECORD_SIZE, INFO_VERSION};
pub use store::{RecordState, SecureObjectStore};
pub use types::{CreateFlags, ObjectInfo, Uid};
pub use uidvault_storage::KvBackend;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
