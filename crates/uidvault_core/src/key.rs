//! Storage key codec.
//!
//! A storage key is `<prefix><uid high:08x><uid low:08x><suffix>`. The UID
//! always takes exactly 16 lowercase hex digits, so two keys with the same
//! prefix differ whenever their UID or suffix differs.

use crate::error::{StoreError, StoreResult};
use crate::types::Uid;

/// Longest storage key accepted by the backend contract.
pub const MAX_KEY_LEN: usize = 32;

/// Number of characters the UID takes in a key.
pub const UID_HEX_LEN: usize = 16;

/// Derives the storage key for `uid` between `prefix` and `suffix`.
///
/// # Errors
///
/// Returns `InvalidArgument` if `prefix` or `suffix` is empty, or if the key
/// would be longer than [`MAX_KEY_LEN`].
///
/// # Example
///
/// ```rust
/// use uidvault_core::{derive_key, Uid};
///
/// let key = derive_key("ts_", Uid::new(0x0102030405060708), "_d").unwrap();
/// assert_eq!(key, "ts_0102030405060708_d");
/// ```
pub fn derive_key(prefix: &str, uid: Uid, suffix: &str) -> StoreResult<String> {
    if prefix.is_empty() {
        return Err(StoreError::invalid_argument("key prefix is empty"));
    }
    if suffix.is_empty() {
        return Err(StoreError::invalid_argument("key suffix is empty"));
    }

    let len = prefix.len() + UID_HEX_LEN + suffix.len();
    if len > MAX_KEY_LEN {
        return Err(StoreError::invalid_argument(format!(
            "storage key would be {len} bytes, limit is {MAX_KEY_LEN}"
        )));
    }

    Ok(format!(
        "{prefix}{:08x}{:08x}{suffix}",
        uid.high(),
        uid.low()
    ))
}

/// Recovers the UID from a key produced by [`derive_key`] with the same
/// `prefix` and `suffix`.
///
/// Returns `None` for any other key.
#[must_use]
pub fn parse_key(prefix: &str, key: &str, suffix: &str) -> Option<Uid> {
    let hex = key.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if hex.len() != UID_HEX_LEN
        || !hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    u64::from_str_radix(hex, 16).ok().map(Uid::new)
}
