use std::path::PathBuf;

/// Caller-facing classification of a storage failure.
///
/// "Absent" is deliberately missing: a document that does not exist yet is
/// reported as `Ok(None)`, never as an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad key or entry shape. Caller error, never retried automatically.
    InvalidInput,
    /// Directory creation, file I/O, or lock acquisition failed.
    StorageUnavailable,
    /// An existing document could not be decoded.
    Corrupt,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid input"),
            Self::StorageUnavailable => write!(f, "storage unavailable"),
            Self::Corrupt => write!(f, "corrupt"),
        }
    }
}

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The caller-supplied key cannot be mapped to a safe file name.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The document file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document file exists but does not hold a JSON object.
    #[error("corrupt document {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The backing directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreateFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing or atomically replacing the target file failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Shared in-memory state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

impl StoreError {
    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Map this error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey { .. } => ErrorKind::InvalidInput,
            Self::Corrupt { .. } => ErrorKind::Corrupt,
            Self::ReadFailure { .. }
            | Self::DirectoryCreateFailure { .. }
            | Self::WriteFailure { .. }
            | Self::Serialization(_)
            | Self::Poisoned(_) => ErrorKind::StorageUnavailable,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
