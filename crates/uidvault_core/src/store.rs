//! Secure object store.
//!
//! Each object occupies two backend entries:
//!
//! ```text
//! <prefix><uid><data_suffix>   ciphertext || tag
//! <prefix><uid><info_suffix>   info record (nonce, size, flags, algorithm)
//! ```
//!
//! Writes go data first, then info. Reads go info first, so an object whose
//! info entry is missing is reported as absent. The backend has no multi-key
//! transactions; a failure between the two writes leaves an orphaned data
//! entry, which `put` reports as `StorageFailure` and `remove` cleans up.
//!
//! The write-once flag lives in the info entry. `remove` trusts it as
//! stored; `purge` checks it against the key first, so a record whose flags
//! were damaged can still be reset.
//!
//! Operations on the same UID must be serialized by the caller.

use crate::backend::ObjectBackend;
use crate::config::StoreConfig;
use crate::crypto::{AeadEngine, EncryptionKey, NonceSource};
use crate::error::{StoreError, StoreResult};
use crate::key::parse_key;
use crate::record::{InfoRecord, INFO_RECORD_SIZE};
use crate::types::{CreateFlags, ObjectInfo, Uid};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uidvault_storage::KvBackend;

/// What the backend holds for one UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Both the data and the info entry are present.
    Complete,
    /// Only the data entry is present, left by an interrupted `put`.
    OrphanData,
    /// Only the info entry is present.
    MissingData,
}

/// Confidential and authenticated object storage addressed by [`Uid`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use uidvault_core::{EncryptionKey, SecureObjectStore, StoreConfig, Uid};
/// use uidvault_storage::InMemoryKvBackend;
///
/// let store = SecureObjectStore::new(StoreConfig::default(), Arc::new(InMemoryKvBackend::new())).unwrap();
/// store.initialize().unwrap();
///
/// let key = EncryptionKey::generate();
/// store.put(Uid::new(7), &key, b"secret", b"").unwrap();
/// assert_eq!(store.get(Uid::new(7), &key, b"").unwrap(), b"secret");
/// ```
pub struct SecureObjectStore {
    config: StoreConfig,
    backend: ObjectBackend,
    engine: Box<dyn AeadEngine>,
    nonces: Box<dyn NonceSource>,
    initialized: AtomicBool,
}

impl SecureObjectStore {
    /// Creates a store over `kv` with the engine and nonce source named by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configuration is invalid.
    pub fn new(config: StoreConfig, kv: Arc<dyn KvBackend>) -> StoreResult<Self> {
        let engine = config.algorithm.engine();
        let nonces = config.nonce_strategy.source();
        Self::with_parts(config, kv, engine, nonces)
    }

    /// Creates a store from explicit parts.
    ///
    /// The engine decides the algorithm of new records; `config.algorithm`
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configuration is invalid.
    pub fn with_parts(
        config: StoreConfig,
        kv: Arc<dyn KvBackend>,
        engine: Box<dyn AeadEngine>,
        nonces: Box<dyn NonceSource>,
    ) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend: ObjectBackend::new(kv),
            engine,
            nonces,
            initialized: AtomicBool::new(false),
        })
    }

    /// Brings up the backend. Must be called once before any other
    /// operation; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the mapped backend error if initialization fails.
    pub fn initialize(&self) -> StoreResult<()> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.backend.initialize()?;
        self.initialized.store(true, Ordering::Release);
        info!(
            prefix = %self.config.prefix,
            algorithm = %self.engine.algorithm(),
            "secure object store initialized"
        );
        Ok(())
    }

    /// Returns true once [`initialize`](Self::initialize) has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the stored size of a plaintext of `plaintext_len` bytes.
    ///
    /// Pure; no I/O and no initialization needed.
    #[must_use]
    pub fn size_of(&self, plaintext_len: usize) -> usize {
        self.engine.size_of(plaintext_len)
    }

    /// Encrypts and stores `plaintext` under `uid`.
    ///
    /// Equivalent to [`put_with_flags`](Self::put_with_flags) with no flags.
    ///
    /// # Errors
    ///
    /// See [`put_with_flags`](Self::put_with_flags).
    pub fn put(
        &self,
        uid: Uid,
        key: &EncryptionKey,
        plaintext: &[u8],
        aad: &[u8],
    ) -> StoreResult<()> {
        self.put_with_flags(uid, key, plaintext, aad, CreateFlags::NONE)
    }

    /// Encrypts and stores `plaintext` under `uid` with creation `flags`.
    ///
    /// Replaces an existing object unless that object is write-once, also
    /// when the existing object was sealed with another cipher.
    ///
    /// # Errors
    ///
    /// - `InsufficientStorage` if `plaintext` exceeds the size limit
    /// - `NotPermitted` if the existing object is write-once
    /// - `DataCorrupt` if the existing info entry is damaged
    /// - `StorageFailure` if a backend write fails; when the info write
    ///   fails after the data write, the data entry is left orphaned
    /// - `BadState` if the store is not initialized or nonces are exhausted
    pub fn put_with_flags(
        &self,
        uid: Uid,
        key: &EncryptionKey,
        plaintext: &[u8],
        aad: &[u8],
        flags: CreateFlags,
    ) -> StoreResult<()> {
        self.ensure_initialized()?;

        if plaintext.len() > self.config.max_object_size {
            return Err(StoreError::insufficient_storage(
                plaintext.len(),
                self.config.max_object_size,
            ));
        }
        let size = u32::try_from(plaintext.len()).map_err(|_| {
            StoreError::insufficient_storage(plaintext.len(), self.config.max_object_size)
        })?;

        match self.read_info(uid) {
            Ok(existing) if existing.flags.is_write_once() => {
                return Err(StoreError::not_permitted(format!(
                    "object {uid} is write-once"
                )));
            }
            Ok(_) | Err(StoreError::DoesNotExist) => {}
            Err(e) => return Err(e),
        }

        let record = InfoRecord {
            algorithm: self.engine.algorithm(),
            flags,
            size,
            nonce: self.nonces.next_nonce()?,
        };
        let bound_aad = record.bound_aad(uid, aad);

        let mut ciphertext = vec![0u8; self.engine.size_of(plaintext.len())];
        let written = self.engine.encrypt(
            key.as_bytes(),
            &record.nonce,
            &bound_aad,
            plaintext,
            &mut ciphertext,
        )?;
        ciphertext.truncate(written);

        self.backend.set_object(
            uid,
            &self.config.prefix,
            &self.config.data_suffix,
            &ciphertext,
        )?;

        if let Err(e) = self.backend.set_object(
            uid,
            &self.config.prefix,
            &self.config.info_suffix,
            &record.encode(),
        ) {
            warn!(%uid, error = %e, "info write failed after data write, record orphaned");
            return Err(StoreError::storage_failure(format!(
                "object {uid} orphaned: info write failed: {e}"
            )));
        }

        debug!(%uid, size, flags = flags.bits(), "object stored");
        Ok(())
    }

    /// Reads, verifies and decrypts the object stored under `uid`.
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` if no info entry exists (the data entry is not read)
    /// - `DataCorrupt` if verification fails or the entries are inconsistent
    /// - `StorageFailure` on backend errors
    /// - `BadState` if the store is not initialized
    pub fn get(&self, uid: Uid, key: &EncryptionKey, aad: &[u8]) -> StoreResult<Vec<u8>> {
        self.ensure_initialized()?;
        let record = self.load_info(uid)?;
        self.open_record(self.engine.as_ref(), uid, key, aad, &record)
    }

    /// Like [`get`](Self::get), but the caller states the plaintext length.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `expected_len` differs from the stored
    /// size, otherwise as [`get`](Self::get).
    pub fn get_with_len(
        &self,
        uid: Uid,
        key: &EncryptionKey,
        aad: &[u8],
        expected_len: usize,
    ) -> StoreResult<Vec<u8>> {
        self.ensure_initialized()?;
        let record = self.load_info(uid)?;
        if record.size as usize != expected_len {
            return Err(StoreError::invalid_argument(format!(
                "object {uid} holds {} bytes, {expected_len} expected",
                record.size
            )));
        }
        self.open_record(self.engine.as_ref(), uid, key, aad, &record)
    }

    /// Returns `len` bytes of the object starting at `offset`.
    ///
    /// The whole object is verified before any byte is returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the range extends past the object,
    /// otherwise as [`get`](Self::get).
    pub fn get_range(
        &self,
        uid: Uid,
        key: &EncryptionKey,
        aad: &[u8],
        offset: usize,
        len: usize,
    ) -> StoreResult<Vec<u8>> {
        let plaintext = self.get(uid, key, aad)?;
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= plaintext.len())
            .ok_or_else(|| {
                StoreError::invalid_argument(format!(
                    "range {offset}+{len} exceeds object {uid} of {} bytes",
                    plaintext.len()
                ))
            })?;
        Ok(plaintext[offset..end].to_vec())
    }

    /// Returns the size and flags of the object under `uid`.
    ///
    /// Only the info entry is read; the ciphertext is not verified.
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` if no info entry exists
    /// - `DataCorrupt` if the info entry is damaged
    /// - `BadState` if the store is not initialized
    pub fn get_info(&self, uid: Uid) -> StoreResult<ObjectInfo> {
        self.ensure_initialized()?;
        Ok(self.load_info(uid)?.object_info())
    }

    /// Removes both entries of the object under `uid`.
    ///
    /// Succeeds if either entry existed, so an orphaned data entry can be
    /// cleaned up. An info entry that cannot be decoded does not block
    /// removal; one that decodes is honoured whatever cipher sealed it.
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` if neither entry existed
    /// - `NotPermitted` if the stored flags mark the object write-once
    /// - `StorageFailure` on backend errors
    /// - `BadState` if the store is not initialized
    pub fn remove(&self, uid: Uid) -> StoreResult<()> {
        self.ensure_initialized()?;

        match self.read_info(uid) {
            Ok(record) if record.flags.is_write_once() => {
                return Err(StoreError::not_permitted(format!(
                    "object {uid} is write-once"
                )));
            }
            Ok(_) | Err(StoreError::DoesNotExist) => {}
            Err(StoreError::DataCorrupt { message }) => {
                warn!(%uid, %message, "removing object with damaged info entry");
            }
            Err(e) => return Err(e),
        }

        self.remove_pair(uid)
    }

    /// Removes the object under `uid` after checking it against `key`.
    ///
    /// Unlike [`remove`](Self::remove), the write-once flag is honoured only
    /// when the object authenticates under `key` and `aad`. An object that
    /// fails authentication is removed whatever its stored flags say, so a
    /// store can be reset after `get` reported `DataCorrupt`. A wrong key or
    /// wrong `aad` cannot be told apart from damage and is treated the same.
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` if neither entry existed
    /// - `NotPermitted` if the object authenticates and is write-once
    /// - `StorageFailure` on backend errors
    /// - `BadState` if the store is not initialized
    pub fn purge(&self, uid: Uid, key: &EncryptionKey, aad: &[u8]) -> StoreResult<()> {
        self.ensure_initialized()?;

        match self.read_info(uid) {
            Ok(record) if record.flags.is_write_once() => {
                let engine = record.algorithm.engine();
                match self.open_record(engine.as_ref(), uid, key, aad, &record) {
                    Ok(_) => {
                        return Err(StoreError::not_permitted(format!(
                            "object {uid} is write-once"
                        )));
                    }
                    Err(StoreError::DataCorrupt { message }) => {
                        warn!(
                            %uid,
                            %message,
                            "purging write-once object that failed authentication"
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(_) | Err(StoreError::DoesNotExist) => {}
            Err(StoreError::DataCorrupt { message }) => {
                warn!(%uid, %message, "purging object with damaged info entry");
            }
            Err(e) => return Err(e),
        }

        self.remove_pair(uid)
    }

    /// Returns every UID with an info entry, ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the backend cannot list its keys.
    pub fn uids(&self) -> StoreResult<Vec<Uid>> {
        Ok(self
            .record_states()?
            .into_iter()
            .filter(|(_, state)| *state != RecordState::OrphanData)
            .map(|(uid, _)| uid)
            .collect())
    }

    /// Classifies every UID the backend holds entries for, ascending.
    ///
    /// Read-only; nothing is repaired.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the backend cannot list its keys.
    pub fn record_states(&self) -> StoreResult<Vec<(Uid, RecordState)>> {
        self.ensure_initialized()?;

        let prefix = &self.config.prefix;
        let mut seen: BTreeMap<Uid, (bool, bool)> = BTreeMap::new();
        for key in self.backend.keys()? {
            if let Some(uid) = parse_key(prefix, &key, &self.config.data_suffix) {
                seen.entry(uid).or_default().0 = true;
            } else if let Some(uid) = parse_key(prefix, &key, &self.config.info_suffix) {
                seen.entry(uid).or_default().1 = true;
            }
        }

        Ok(seen
            .into_iter()
            .map(|(uid, (data, info))| {
                let state = match (data, info) {
                    (true, true) => RecordState::Complete,
                    (true, false) => RecordState::OrphanData,
                    _ => RecordState::MissingData,
                };
                (uid, state)
            })
            .collect())
    }

    fn ensure_initialized(&self) -> StoreResult<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(StoreError::bad_state("store is not initialized"))
        }
    }

    /// Reads and decodes the info entry without checking its cipher.
    fn read_info(&self, uid: Uid) -> StoreResult<InfoRecord> {
        let prefix = &self.config.prefix;
        let suffix = &self.config.info_suffix;

        let stored = self.backend.get_object_len(uid, prefix, suffix)?;
        if stored != INFO_RECORD_SIZE {
            return Err(StoreError::data_corrupt(format!(
                "info entry of {uid} is {stored} bytes, expected {INFO_RECORD_SIZE}"
            )));
        }

        let mut buf = [0u8; INFO_RECORD_SIZE];
        match self.backend.get_object(uid, prefix, suffix, &mut buf) {
            Ok(()) => {}
            Err(StoreError::InvalidArgument { message }) => {
                return Err(StoreError::data_corrupt(format!(
                    "info entry of {uid} changed while reading: {message}"
                )));
            }
            Err(e) => return Err(e),
        }
        InfoRecord::decode(&buf)
    }

    /// Reads the info entry and requires it to match the store's cipher.
    fn load_info(&self, uid: Uid) -> StoreResult<InfoRecord> {
        let record = self.read_info(uid)?;
        if record.algorithm != self.engine.algorithm() {
            return Err(StoreError::data_corrupt(format!(
                "object {uid} was sealed with {}, store uses {}",
                record.algorithm,
                self.engine.algorithm()
            )));
        }
        Ok(record)
    }

    fn open_record(
        &self,
        engine: &dyn AeadEngine,
        uid: Uid,
        key: &EncryptionKey,
        aad: &[u8],
        record: &InfoRecord,
    ) -> StoreResult<Vec<u8>> {
        let prefix = &self.config.prefix;
        let suffix = &self.config.data_suffix;
        let expected = engine.size_of(record.size as usize);

        let stored = match self.backend.get_object_len(uid, prefix, suffix) {
            Ok(len) => len,
            Err(StoreError::DoesNotExist) => {
                warn!(%uid, "info entry present but data entry missing");
                return Err(StoreError::data_corrupt(format!(
                    "object {uid} has no data entry"
                )));
            }
            Err(e) => return Err(e),
        };
        if stored != expected {
            warn!(%uid, stored, expected, "ciphertext length mismatch");
            return Err(StoreError::data_corrupt(format!(
                "object {uid} data entry is {stored} bytes, expected {expected}"
            )));
        }

        let mut ciphertext = vec![0u8; expected];
        match self.backend.get_object(uid, prefix, suffix, &mut ciphertext) {
            Ok(()) => {}
            Err(StoreError::DoesNotExist | StoreError::InvalidArgument { .. }) => {
                return Err(StoreError::data_corrupt(format!(
                    "object {uid} data entry changed while reading"
                )));
            }
            Err(e) => return Err(e),
        }

        let bound_aad = record.bound_aad(uid, aad);
        let mut plaintext = vec![0u8; record.size as usize];
        if let Err(e) = engine.decrypt(
            key.as_bytes(),
            &record.nonce,
            &bound_aad,
            &ciphertext,
            &mut plaintext,
        ) {
            if matches!(e, StoreError::DataCorrupt { .. }) {
                warn!(%uid, "authentication failed");
            }
            return Err(e);
        }

        debug!(%uid, size = record.size, "object read");
        Ok(plaintext)
    }

    /// Deletes info then data. Succeeds if either existed.
    fn remove_pair(&self, uid: Uid) -> StoreResult<()> {
        let info_removed = self.remove_entry(uid, &self.config.info_suffix)?;
        let data_removed = self.remove_entry(uid, &self.config.data_suffix)?;

        match (info_removed, data_removed) {
            (false, false) => Err(StoreError::DoesNotExist),
            (false, true) => {
                warn!(%uid, "removed orphaned data entry");
                Ok(())
            }
            (true, false) => {
                warn!(%uid, "removed info entry without data");
                Ok(())
            }
            (true, true) => {
                debug!(%uid, "object removed");
                Ok(())
            }
        }
    }

    fn remove_entry(&self, uid: Uid, suffix: &str) -> StoreResult<bool> {
        match self.backend.remove_object(uid, &self.config.prefix, suffix) {
            Ok(()) => Ok(true),
            Err(StoreError::DoesNotExist) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for SecureObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureObjectStore")
            .field("config", &self.config)
            .field("algorithm", &self.engine.algorithm())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
