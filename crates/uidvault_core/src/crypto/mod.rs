//! Authenticated encryption for stored objects.
//!
//! ## Security Model
//!
//! - AES-256-GCM (default) or ChaCha20-Poly1305, both with a 16-byte tag
//! - One fresh nonce per encryption, supplied by a [`NonceSource`]
//! - Keys are supplied by the caller and zeroized on drop
//! - Decryption never releases bytes that failed verification

mod engine;
mod key;
mod nonce;

pub use engine::{AeadAlgorithm, AeadEngine, Aes256GcmEngine, ChaCha20Poly1305Engine};
pub use key::EncryptionKey;
pub use nonce::{CounterNonce, NonceSource, RandomNonce};

/// Size of the symmetric key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;
