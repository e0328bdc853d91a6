//! AEAD engines.
//!
//! Both engines encrypt into a caller-provided buffer laid out as
//! `ciphertext || tag`, so the stored size is always
//! `plaintext_len + TAG_SIZE`.

use super::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use crate::error::{StoreError, StoreResult};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use std::fmt;
use std::str::FromStr;

/// Authenticated cipher used for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AeadAlgorithm {
    /// AES-256 in Galois/Counter Mode.
    #[default]
    Aes256Gcm = 1,
    /// ChaCha20 with a Poly1305 authenticator.
    ChaCha20Poly1305 = 2,
}

impl AeadAlgorithm {
    /// Converts a stored identifier to an algorithm.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Aes256Gcm),
            2 => Some(Self::ChaCha20Poly1305),
            _ => None,
        }
    }

    /// Returns the stored identifier of the algorithm.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns an engine for this algorithm.
    #[must_use]
    pub fn engine(self) -> Box<dyn AeadEngine> {
        match self {
            Self::Aes256Gcm => Box::new(Aes256GcmEngine),
            Self::ChaCha20Poly1305 => Box::new(ChaCha20Poly1305Engine),
        }
    }
}

impl fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes256Gcm => f.write_str("aes-256-gcm"),
            Self::ChaCha20Poly1305 => f.write_str("chacha20-poly1305"),
        }
    }
}

impl FromStr for AeadAlgorithm {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aes-256-gcm" | "aes256gcm" | "aes" => Ok(Self::Aes256Gcm),
            "chacha20-poly1305" | "chacha20poly1305" | "chacha" => Ok(Self::ChaCha20Poly1305),
            other => Err(StoreError::invalid_argument(format!(
                "unknown AEAD algorithm: {other}"
            ))),
        }
    }
}

/// Authenticated encryption with explicit key, nonce and associated data.
///
/// Engines are stateless. They never generate nonces; the caller must never
/// reuse a nonce under the same key.
pub trait AeadEngine: Send + Sync + fmt::Debug {
    /// Returns the algorithm implemented by this engine.
    fn algorithm(&self) -> AeadAlgorithm;

    /// Returns the ciphertext size for a plaintext of `plaintext_len` bytes.
    fn size_of(&self, plaintext_len: usize) -> usize {
        plaintext_len + TAG_SIZE
    }

    /// Encrypts `plaintext` into `out` as `ciphertext || tag`.
    ///
    /// Returns the number of bytes written, always `size_of(plaintext.len())`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the key or nonce has the wrong length or
    /// `out` is smaller than `size_of(plaintext.len())`.
    fn encrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) -> StoreResult<usize>;

    /// Verifies and decrypts `ciphertext || tag` into `out`.
    ///
    /// Returns the number of bytes written, always
    /// `ciphertext.len() - TAG_SIZE`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the key or nonce has the wrong length, the
    ///   input is shorter than the tag, or `out` is too small
    /// - `DataCorrupt` if verification fails; `out` is zeroed in that case
    fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> StoreResult<usize>;
}

/// AES-256-GCM engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256GcmEngine;

impl AeadEngine for Aes256GcmEngine {
    fn algorithm(&self) -> AeadAlgorithm {
        AeadAlgorithm::Aes256Gcm
    }

    fn encrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) -> StoreResult<usize> {
        seal::<Aes256Gcm>(key, nonce, aad, plaintext, out)
    }

    fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> StoreResult<usize> {
        open::<Aes256Gcm>(key, nonce, aad, ciphertext, out)
    }
}

/// ChaCha20-Poly1305 engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaCha20Poly1305Engine;

impl AeadEngine for ChaCha20Poly1305Engine {
    fn algorithm(&self) -> AeadAlgorithm {
        AeadAlgorithm::ChaCha20Poly1305
    }

    fn encrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) -> StoreResult<usize> {
        seal::<ChaCha20Poly1305>(key, nonce, aad, plaintext, out)
    }

    fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        out: &mut [u8],
    ) -> StoreResult<usize> {
        open::<ChaCha20Poly1305>(key, nonce, aad, ciphertext, out)
    }
}

fn check_key_and_nonce(key: &[u8], nonce: &[u8]) -> StoreResult<()> {
    if key.len() != KEY_SIZE {
        return Err(StoreError::invalid_argument(format!(
            "invalid key size: expected {KEY_SIZE} bytes, got {}",
            key.len()
        )));
    }
    if nonce.len() != NONCE_SIZE {
        return Err(StoreError::invalid_argument(format!(
            "invalid nonce size: expected {NONCE_SIZE} bytes, got {}",
            nonce.len()
        )));
    }
    Ok(())
}

fn seal<C>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    out: &mut [u8],
) -> StoreResult<usize>
where
    C: AeadInPlace + KeyInit,
{
    check_key_and_nonce(key, nonce)?;
    let needed = plaintext
        .len()
        .checked_add(TAG_SIZE)
        .ok_or_else(|| StoreError::invalid_argument("plaintext too large"))?;
    if out.len() < needed {
        return Err(StoreError::invalid_argument(format!(
            "output buffer is {} bytes, need {needed}",
            out.len()
        )));
    }

    let cipher = C::new_from_slice(key)
        .map_err(|_| StoreError::invalid_argument("key rejected by cipher"))?;

    let (body, rest) = out.split_at_mut(plaintext.len());
    body.copy_from_slice(plaintext);
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, body)
        .map_err(|_| StoreError::invalid_argument("plaintext too large for cipher"))?;
    rest[..TAG_SIZE].copy_from_slice(&tag);

    Ok(needed)
}

fn open<C>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    out: &mut [u8],
) -> StoreResult<usize>
where
    C: AeadInPlace + KeyInit,
{
    check_key_and_nonce(key, nonce)?;
    let Some(body_len) = ciphertext.len().checked_sub(TAG_SIZE) else {
        return Err(StoreError::invalid_argument(format!(
            "ciphertext is {} bytes, shorter than the {TAG_SIZE}-byte tag",
            ciphertext.len()
        )));
    };
    if out.len() < body_len {
        return Err(StoreError::invalid_argument(format!(
            "output buffer is {} bytes, need {body_len}",
            out.len()
        )));
    }

    let cipher = C::new_from_slice(key)
        .map_err(|_| StoreError::invalid_argument("key rejected by cipher"))?;

    let (body, tag) = ciphertext.split_at(body_len);
    let plaintext = &mut out[..body_len];
    plaintext.copy_from_slice(body);
    if cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            aad,
            plaintext,
            GenericArray::from_slice(tag),
        )
        .is_err()
    {
        plaintext.fill(0);
        return Err(StoreError::data_corrupt("authentication failed"));
    }

    Ok(body_len)
}
