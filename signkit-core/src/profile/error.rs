use signkit_store::StorageError;
use thiserror::Error;

use crate::keyring::KeyringError;

/// Result type for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors raised by [`UserProfile`](super::UserProfile).
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile was locked and its keyring discarded.
    #[error("profile is locked")]
    ProfileLocked,

    /// No entry at the requested index.
    #[error("entry {index} not found, keyring has {count} entries")]
    EntryNotFound {
        /// Requested index.
        index: usize,
        /// Number of entries in the keyring.
        count: usize,
    },

    /// A required record is absent from the store.
    #[error("missing field in store: {0}")]
    MissingField(&'static str),

    /// The stored creation timestamp is not valid RFC 3339.
    #[error("invalid creation timestamp: {0}")]
    InvalidTimestamp(String),

    /// Keyring failure, including signing failures from an entry.
    #[error(transparent)]
    Keyring(#[from] KeyringError),

    /// Store failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
