//! Error types for admin log operations.

use std::path::PathBuf;

use rovernet_store::{ErrorKind, StoreError};
use thiserror::Error;

/// Errors that can occur while appending to or reading the admin log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The incoming entry is missing a field or has the wrong shape.
    #[error("invalid log entry: {field}: {reason}")]
    InvalidEntry { field: &'static str, reason: String },

    /// Directory creation or atomic replacement of the log file failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The entry sequence could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The cross-process lock stayed contended for the whole retry budget.
    #[error("timed out acquiring {} after {attempts} attempts", path.display())]
    LockTimeout { path: PathBuf, attempts: u32 },

    /// The lock file could not be opened or locked.
    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            field,
            reason: reason.into(),
        }
    }

    /// Map this error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEntry { .. } => ErrorKind::InvalidInput,
            Self::Storage(e) => e.kind(),
            Self::Serialization(_) | Self::LockTimeout { .. } | Self::Lock { .. } => {
                ErrorKind::StorageUnavailable
            }
        }
    }
}

/// Convenience type alias for admin log operations.
pub type LogResult<T> = std::result::Result<T, LogError>;
