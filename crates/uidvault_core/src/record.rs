//! Info record stored next to each ciphertext.
//!
//! Layout (little-endian, 24 bytes):
//!
//! ```text
//! version u8 | algorithm u8 | reserved u16 | flags u32 | size u32 | nonce [u8; 12]
//! ```

use crate::crypto::{AeadAlgorithm, NONCE_SIZE};
use crate::error::{StoreError, StoreResult};
use crate::types::{CreateFlags, ObjectInfo, Uid};

/// Current info record format version.
pub const INFO_VERSION: u8 = 1;

/// Encoded size of an info record.
pub const INFO_RECORD_SIZE: usize = 24;

/// Metadata needed to decrypt and size one stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoRecord {
    /// Cipher the data entry was sealed with.
    pub algorithm: AeadAlgorithm,
    /// Flags the object was created with.
    pub flags: CreateFlags,
    /// Plaintext size in bytes.
    pub size: u32,
    /// Nonce the data entry was sealed with.
    pub nonce: [u8; NONCE_SIZE],
}

impl InfoRecord {
    /// Encodes the record.
    #[must_use]
    pub fn encode(&self) -> [u8; INFO_RECORD_SIZE] {
        let mut buf = [0u8; INFO_RECORD_SIZE];
        buf[0] = INFO_VERSION;
        buf[1] = self.algorithm.id();
        // buf[2..4] reserved
        buf[4..8].copy_from_slice(&self.flags.bits().to_le_bytes());
        buf[8..12].copy_from_slice(&self.size.to_le_bytes());
        buf[12..24].copy_from_slice(&self.nonce);
        buf
    }

    /// Decodes a record.
    ///
    /// # Errors
    ///
    /// Returns `DataCorrupt` for a wrong length, unknown version, algorithm
    /// or flag bits, or nonzero reserved bytes.
    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        if bytes.len() != INFO_RECORD_SIZE {
            return Err(StoreError::data_corrupt(format!(
                "info record is {} bytes, expected {INFO_RECORD_SIZE}",
                bytes.len()
            )));
        }
        if bytes[0] != INFO_VERSION {
            return Err(StoreError::data_corrupt(format!(
                "unsupported info record version {}",
                bytes[0]
            )));
        }
        let algorithm = AeadAlgorithm::from_id(bytes[1]).ok_or_else(|| {
            StoreError::data_corrupt(format!("unknown algorithm id {}", bytes[1]))
        })?;
        if bytes[2] != 0 || bytes[3] != 0 {
            return Err(StoreError::data_corrupt("reserved info bytes are set"));
        }

        let flags_bits = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let flags = CreateFlags::from_bits(flags_bits)
            .map_err(|_| StoreError::data_corrupt(format!("unknown flags {flags_bits:#x}")))?;
        let size = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[12..24]);

        Ok(Self {
            algorithm,
            flags,
            size,
            nonce,
        })
    }

    /// Builds the associated data actually authenticated for this record.
    ///
    /// Binds the UID, flags and size so a ciphertext cannot be moved to
    /// another UID and the size and flags cannot be altered undetected.
    #[must_use]
    pub fn bound_aad(&self, uid: Uid, caller_aad: &[u8]) -> Vec<u8> {
        let mut aad = Vec::with_capacity(16 + caller_aad.len());
        aad.extend_from_slice(&uid.as_u64().to_le_bytes());
        aad.extend_from_slice(&self.flags.bits().to_le_bytes());
        aad.extend_from_slice(&self.size.to_le_bytes());
        aad.extend_from_slice(caller_aad);
        aad
    }

    /// Returns the public part of the record.
    #[must_use]
    pub fn object_info(&self) -> ObjectInfo {
        ObjectInfo {
            size: self.size as usize,
            flags: self.flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InfoRecord {
        InfoRecord {
            algorithm: AeadAlgorithm::ChaCha20Poly1305,
            flags: CreateFlags::WRITE_ONCE,
            size: 0x0102_0304,
            nonce: [9; NONCE_SIZE],
        }
    }

    #[test]
    fn encode_layout() {
        let bytes = sample().encode();
        assert_eq!(bytes[0], INFO_VERSION);
        assert_eq!(bytes[1], 2);
        assert_eq!(&bytes[2..4], &[0, 0]);
        assert_eq!(&bytes[4..8], &[1, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[4, 3, 2, 1]);
        assert_eq!(&bytes[12..], &[9; NONCE_SIZE]);
    }

    #[test]
    fn decode_encoded() {
        let record = sample();
        assert_eq!(InfoRecord::decode(&record.encode()).unwrap(), record);
    }

    #[test]
    fn decode_rejects_damage() {
        let good = sample().encode();

        let mut longer = good.to_vec();
        longer.push(0);
        let mut cases = vec![good[..23].to_vec(), longer];
        for (index, value) in [(0usize, 7u8), (1, 0), (1, 9), (2, 1), (3, 1), (4, 0x02)] {
            let mut bad = good.to_vec();
            bad[index] = value;
            cases.push(bad);
        }

        for bytes in cases {
            assert!(
                matches!(
                    InfoRecord::decode(&bytes),
                    Err(StoreError::DataCorrupt { .. })
                ),
                "{bytes:?} should not decode"
            );
        }
    }

    #[test]
    fn bound_aad_covers_uid_flags_and_size() {
        let record = sample();
        let base = record.bound_aad(Uid::new(1), b"ctx");
        assert_eq!(&base[16..], b"ctx");
        assert_ne!(base, record.bound_aad(Uid::new(2), b"ctx"));

        let mut other = record;
        other.size += 1;
        assert_ne!(base, other.bound_aad(Uid::new(1), b"ctx"));

        other = record;
        other.flags = CreateFlags::NONE;
        assert_ne!(base, other.bound_aad(Uid::new(1), b"ctx"));
    }
}
