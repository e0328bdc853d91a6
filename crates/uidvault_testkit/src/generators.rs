//! Property-based test generators using proptest.
//!
//! UIDs are produced as raw `u64` values so this crate stays independent of
//! the store crate.

use proptest::prelude::*;

/// Strategy for raw UID values, biased toward the edges.
pub fn uid_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        Just(0u64),
        Just(u64::MAX),
        Just(0x0000_0001_0000_0000),
        any::<u64>(),
    ]
}

/// Strategy for plaintexts up to `max_len` bytes, empty included.
pub fn plaintext_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for caller associated data.
pub fn aad_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Strategy for 32-byte key material.
pub fn key_bytes_strategy() -> impl Strategy<Value = [u8; 32]> {
    prop::array::uniform32(any::<u8>())
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn plaintexts_respect_bound(data in plaintext_strategy(16)) {
            prop_assert!(data.len() <= 16);
        }
    }
}
