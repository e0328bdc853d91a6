//! Error types and status codes for uidvault core.

use std::fmt;
use thiserror::Error;
use uidvault_storage::StorageError;

/// Result type for core operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in uidvault core operations.
///
/// Every variant maps to exactly one [`Status`] via [`StoreError::status`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The call was malformed. Not retryable.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// No record exists for the requested object.
    #[error("object does not exist")]
    DoesNotExist,

    /// Authentication failed or the backend detected damaged data.
    #[error("data corrupt: {message}")]
    DataCorrupt {
        /// Description of the corruption.
        message: String,
    },

    /// The backend failed. May be transient.
    #[error("storage failure: {message}")]
    StorageFailure {
        /// Description of the failure.
        message: String,
    },

    /// The object is larger than the store accepts.
    #[error("insufficient storage: {requested} bytes requested, limit is {limit}")]
    InsufficientStorage {
        /// Requested plaintext size in bytes.
        requested: usize,
        /// Largest accepted plaintext size in bytes.
        limit: usize,
    },

    /// The object's flags forbid the operation.
    #[error("not permitted: {message}")]
    NotPermitted {
        /// Why the operation was refused.
        message: String,
    },

    /// The store or one of its parts is not in a state to serve the call.
    #[error("bad state: {message}")]
    BadState {
        /// Description of the state problem.
        message: String,
    },
}

impl StoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a data corrupt error.
    pub fn data_corrupt(message: impl Into<String>) -> Self {
        Self::DataCorrupt {
            message: message.into(),
        }
    }

    /// Creates a storage failure error.
    pub fn storage_failure(message: impl Into<String>) -> Self {
        Self::StorageFailure {
            message: message.into(),
        }
    }

    /// Creates an insufficient storage error.
    pub fn insufficient_storage(requested: usize, limit: usize) -> Self {
        Self::InsufficientStorage { requested, limit }
    }

    /// Creates a not permitted error.
    pub fn not_permitted(message: impl Into<String>) -> Self {
        Self::NotPermitted {
            message: message.into(),
        }
    }

    /// Creates a bad state error.
    pub fn bad_state(message: impl Into<String>) -> Self {
        Self::BadState {
            message: message.into(),
        }
    }

    /// Returns the status code this error reports to callers.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidArgument { .. } => Status::InvalidArgument,
            Self::DoesNotExist => Status::DoesNotExist,
            Self::DataCorrupt { .. } => Status::DataCorrupt,
            Self::StorageFailure { .. } => Status::StorageFailure,
            Self::InsufficientStorage { .. } => Status::InsufficientStorage,
            Self::NotPermitted { .. } => Status::NotPermitted,
            Self::BadState { .. } => Status::BadState,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::DoesNotExist,
            StorageError::Corrupted(message) => Self::DataCorrupt { message },
            StorageError::InvalidKey { .. } => Self::invalid_argument(err.to_string()),
            StorageError::OutOfSpace { .. } | StorageError::Io(_) | StorageError::Locked => {
                Self::storage_failure(err.to_string())
            }
        }
    }
}

/// Status codes reported to callers.
///
/// The numeric codes follow the PSA Storage API numbering so that hosts
/// speaking that convention can pass them through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation completed.
    Success,
    /// The call was malformed.
    InvalidArgument,
    /// No record exists.
    DoesNotExist,
    /// Integrity or authentication failure.
    DataCorrupt,
    /// Backend I/O or internal failure.
    StorageFailure,
    /// Capacity exhausted.
    InsufficientStorage,
    /// Refused because of the object's flags.
    NotPermitted,
    /// Store not ready.
    BadState,
}

impl Status {
    /// Every status, in code order starting from success.
    pub const ALL: [Status; 8] = [
        Status::Success,
        Status::NotPermitted,
        Status::InvalidArgument,
        Status::BadState,
        Status::DoesNotExist,
        Status::InsufficientStorage,
        Status::StorageFailure,
        Status::DataCorrupt,
    ];

    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NotPermitted => -133,
            Self::InvalidArgument => -135,
            Self::BadState => -137,
            Self::DoesNotExist => -140,
            Self::InsufficientStorage => -142,
            Self::StorageFailure => -146,
            Self::DataCorrupt => -152,
        }
    }

    /// Looks up a status by its numeric code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    /// Returns the status of an operation result.
    #[must_use]
    pub fn of<T>(result: &StoreResult<T>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => e.status(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::InvalidArgument => "invalid argument",
            Self::DoesNotExist => "does not exist",
            Self::DataCorrupt => "data corrupt",
            Self::StorageFailure => "storage failure",
            Self::InsufficientStorage => "insufficient storage",
            Self::NotPermitted => "not permitted",
            Self::BadState => "bad state",
        };
        f.write_str(name)
    }
}
