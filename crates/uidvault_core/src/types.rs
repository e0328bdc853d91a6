//! Core type definitions for uidvault.

use crate::error::{StoreError, StoreResult};
use std::fmt;
use std::ops::BitOr;

/// Identifier of one logical object in the store.
///
/// UIDs are opaque 64-bit values chosen by the caller. They need not be
/// dense or ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(pub u64);

impl Uid {
    /// Creates a new UID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw UID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the high 32 bits.
    #[must_use]
    pub const fn high(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the low 32 bits.
    #[must_use]
    pub const fn low(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }
}

impl From<u64> for Uid {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Flags fixed when an object is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CreateFlags(u32);

impl CreateFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// The object can be written once and never modified or removed.
    pub const WRITE_ONCE: Self = Self(1 << 0);

    const KNOWN: u32 = Self::WRITE_ONCE.0;

    /// Creates flags from raw bits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any unknown bit is set.
    pub fn from_bits(bits: u32) -> StoreResult<Self> {
        if bits & !Self::KNOWN != 0 {
            return Err(StoreError::invalid_argument(format!(
                "unknown create flags {bits:#x}"
            )));
        }
        Ok(Self(bits))
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the object may never be changed or removed.
    #[must_use]
    pub const fn is_write_once(self) -> bool {
        self.contains(Self::WRITE_ONCE)
    }
}

impl BitOr for CreateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Public metadata of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Plaintext size in bytes.
    pub size: usize,
    /// Flags the object was created with.
    pub flags: CreateFlags,
}
