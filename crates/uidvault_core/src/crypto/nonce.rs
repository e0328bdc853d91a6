//! Nonce generation.

use super::NONCE_SIZE;
use crate::error::{StoreError, StoreResult};
use rand::RngCore;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Supplies one fresh nonce per encryption.
pub trait NonceSource: Send + Sync + fmt::Debug {
    /// Returns the next nonce.
    ///
    /// # Errors
    ///
    /// Returns `BadState` if the source cannot produce another unique nonce.
    fn next_nonce(&self) -> StoreResult<[u8; NONCE_SIZE]>;
}

/// Draws every nonce from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> StoreResult<[u8; NONCE_SIZE]> {
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);
        Ok(nonce)
    }
}

/// Random 4-byte seed followed by a 64-bit big-endian counter.
///
/// Nonces from one instance never repeat. The seed separates instances, so
/// restarting the process does not replay the counter space under the same
/// key with high probability.
#[derive(Debug)]
pub struct CounterNonce {
    seed: [u8; 4],
    counter: AtomicU64,
}

impl CounterNonce {
    /// Creates a counter source with a random seed, starting at zero.
    #[must_use]
    pub fn new() -> Self {
        let mut seed = [0u8; 4];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::with_seed(seed, 0)
    }

    /// Creates a counter source with an explicit seed and start value.
    #[must_use]
    pub fn with_seed(seed: [u8; 4], start: u64) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(start),
        }
    }
}

impl Default for CounterNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceSource for CounterNonce {
    fn next_nonce(&self) -> StoreResult<[u8; NONCE_SIZE]> {
        let value = self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_add(1))
            .map_err(|_| StoreError::bad_state("nonce counter exhausted"))?;

        let mut nonce = [0u8; NONCE_SIZE];
        nonce[..4].copy_from_slice(&self.seed);
        nonce[4..].copy_from_slice(&value.to_be_bytes());
        Ok(nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_nonces_differ() {
        let source = RandomNonce;
        assert_ne!(source.next_nonce().unwrap(), source.next_nonce().unwrap());
    }

    #[test]
    fn counter_layout() {
        let source = CounterNonce::with_seed([0xAA, 0xBB, 0xCC, 0xDD], 0x0102);
        let nonce = source.next_nonce().unwrap();
        assert_eq!(nonce, [0xAA, 0xBB, 0xCC, 0xDD, 0, 0, 0, 0, 0, 0, 0x01, 0x02]);
        assert_eq!(source.next_nonce().unwrap()[11], 0x03);
    }

    #[test]
    fn counter_never_repeats() {
        let source = CounterNonce::new();
        let seen: HashSet<_> = (0..1000).map(|_| source.next_nonce().unwrap()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn counter_exhaustion_is_bad_state() {
        let source = CounterNonce::with_seed([0; 4], u64::MAX - 1);
        assert!(source.next_nonce().is_ok());
        assert!(matches!(
            source.next_nonce(),
            Err(StoreError::BadState { .. })
        ));
    }
}
