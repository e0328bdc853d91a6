//! Store configuration.

use crate::crypto::{AeadAlgorithm, CounterNonce, NonceSource, RandomNonce};
use crate::error::{StoreError, StoreResult};
use crate::key::derive_key;
use crate::types::Uid;

/// How nonces are produced for new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonceStrategy {
    /// A fresh random nonce per write.
    #[default]
    Random,
    /// Random per-store seed followed by a counter.
    Counter,
}

impl NonceStrategy {
    /// Creates a nonce source for this strategy.
    #[must_use]
    pub fn source(self) -> Box<dyn NonceSource> {
        match self {
            Self::Random => Box::new(RandomNonce),
            Self::Counter => Box::new(CounterNonce::new()),
        }
    }
}

/// Configuration for a secure object store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Key prefix shared by both namespaces of a record.
    pub prefix: String,

    /// Key suffix of the ciphertext entry.
    pub data_suffix: String,

    /// Key suffix of the info entry (nonce, size, flags).
    pub info_suffix: String,

    /// Largest plaintext accepted by `put`, in bytes.
    pub max_object_size: usize,

    /// Cipher used for new records.
    pub algorithm: AeadAlgorithm,

    /// Nonce generation for new records.
    pub nonce_strategy: NonceStrategy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: "ts_".to_string(),
            data_suffix: "_d".to_string(),
            info_suffix: "_i".to_string(),
            max_object_size: 64 * 1024, // 64 KiB
            algorithm: AeadAlgorithm::Aes256Gcm,
            nonce_strategy: NonceStrategy::Random,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the ciphertext key suffix.
    #[must_use]
    pub fn data_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.data_suffix = suffix.into();
        self
    }

    /// Sets the info key suffix.
    #[must_use]
    pub fn info_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.info_suffix = suffix.into();
        self
    }

    /// Sets the largest accepted plaintext size.
    #[must_use]
    pub const fn max_object_size(mut self, size: usize) -> Self {
        self.max_object_size = size;
        self
    }

    /// Sets the cipher for new records.
    #[must_use]
    pub const fn algorithm(mut self, algorithm: AeadAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the nonce strategy.
    #[must_use]
    pub const fn nonce_strategy(mut self, strategy: NonceStrategy) -> Self {
        self.nonce_strategy = strategy;
        self
    }

    /// Checks that the configuration can address records.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the prefix or a suffix is empty, if a
    /// derived key would be too long, if both namespaces share a suffix, or
    /// if the size limit does not fit the 32-bit size field of the info
    /// record.
    pub fn validate(&self) -> StoreResult<()> {
        derive_key(&self.prefix, Uid::new(0), &self.data_suffix)?;
        derive_key(&self.prefix, Uid::new(0), &self.info_suffix)?;

        if self.data_suffix == self.info_suffix {
            return Err(StoreError::invalid_argument(
                "data and info suffixes must differ",
            ));
        }
        if u32::try_from(self.max_object_size).is_err() {
            return Err(StoreError::invalid_argument(format!(
                "max object size {} exceeds {}",
                self.max_object_size,
                u32::MAX
            )));
        }
        Ok(())
    }
}
