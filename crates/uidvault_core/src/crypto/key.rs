//! Symmetric key material.

use super::KEY_SIZE;
use crate::error::{StoreError, StoreResult};
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Caller-supplied AEAD key. Zeroized on drop.
///
/// The store never derives, persists or rotates keys; the same key must be
/// presented to read what was written with it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Draws a key from the thread-local CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Draws a key from `rng`.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut material = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut material);
        Self(material)
    }

    /// Copies a key out of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` unless `bytes` holds exactly `KEY_SIZE` bytes.
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        let material: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            StoreError::invalid_argument(format!(
                "key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(material))
    }

    /// Raw key material. Never log it.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for EncryptionKey {
    fn from(material: [u8; KEY_SIZE]) -> Self {
        Self(material)
    }
}

impl TryFrom<&[u8]> for EncryptionKey {
    type Error = StoreError;

    fn try_from(bytes: &[u8]) -> StoreResult<Self> {
        Self::from_bytes(bytes)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}
