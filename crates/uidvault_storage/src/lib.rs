//! # uidvault Storage
//!
//! Key-value persistence substrate for uidvault.
//!
//! This crate provides the lowest-level storage abstraction for uidvault.
//! Backends are **opaque key-value stores** - they map short textual keys to
//! byte values and do not interpret either.
//!
//! ## Design Principles
//!
//! - Backends offer get, set and delete by key, nothing more
//! - A `set` replaces the whole value of one key atomically
//! - No ordering between keys and no multi-key transactions
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryKvBackend`] - For testing and ephemeral storage
//! - [`DirKvBackend`] - One checksummed file per key inside a locked directory
//!
//! ## Example
//!
//! ```rust
//! use uidvault_storage::{KvBackend, InMemoryKvBackend};
//!
//! let backend = InMemoryKvBackend::new();
//! backend.set("greeting", b"hello world").unwrap();
//! assert_eq!(backend.get("greeting").unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod checksum;
mod dir;
mod error;
mod memory;

pub use backend::KvBackend;
pub use checksum::compute_crc32;
pub use dir::DirKvBackend;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryKvBackend;
