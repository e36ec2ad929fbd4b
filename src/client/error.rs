//! Client Error Types
//!
//! - `StorageError` - the persistence substrate failed or holds corrupt data
//! - `RemoteError` - the report API rejected or never answered a request
//! - `QueueError` - a queue store operation failed (storage or integrity)
//! - `SyncError` - a drain pass was aborted
//! - `SubmitError` - a report could be neither sent nor saved locally
//!
//! `RemoteError` is recovered per item inside the sync engine and never
//! reaches the UI. `StorageError` reaches the UI only through
//! `SubmitError::Storage`, because the user must know when a report was not
//! durably saved.

use thiserror::Error;
use uuid::Uuid;

use crate::shared::SharedError;

/// Persistence substrate failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store could not be read or written
    #[error("Storage backend error: {message}")]
    Backend {
        /// Human-readable error message
        message: String,
    },

    /// Stored data could not be encoded or decoded
    #[error("Storage serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::backend(format!("SQLite error: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Remote submission or listing failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection could not be established or was interrupted
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// No answer within the configured bound
    #[error("Request timed out")]
    Timeout,

    /// Server answered with a non-2xx status
    #[error("Server rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Server answered 2xx with a body we could not decode
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Human-readable error message
        message: String,
    },
}

impl RemoteError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::rejected(status.as_u16(), err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Queue store failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The same local id appears twice; indicates a bug, never retried
    #[error("Integrity violation: duplicate local id {local_id} in offline queue")]
    IntegrityViolation {
        /// The duplicated identifier
        local_id: Uuid,
    },
}

/// A drain pass could not complete
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The queue could not be read or committed; the store was not mutated
    #[error("Drain pass aborted: {0}")]
    Aborted(#[from] QueueError),
}

/// A report could not be sent nor saved locally
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The draft is incomplete
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Saving to the offline queue failed
    #[error("Report could not be saved locally: {0}")]
    Storage(#[from] QueueError),
}
