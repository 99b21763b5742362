//! Error types for key-value store backends.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by key-value store backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure, with the operation that failed.
    #[error("io error while {context}: {source}")]
    Io {
        /// What the store was doing.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The persisted document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store was closed and can no longer be used.
    #[error("store is closed")]
    Closed,

    /// Backend-specific failure reported by a foreign implementation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
