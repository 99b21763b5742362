use thiserror::Error;

/// Result type for keyring operations.
pub type KeyringResult<T> = Result<T, KeyringError>;

/// Errors raised by keyrings and their entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyringError {
    /// A serialized keyring or entry is malformed, has an unsupported
    /// version or names an unknown implementation.
    #[error("invalid keyring serialization: {0}")]
    InvalidSerialization(String),

    /// The entry could not produce a signature.
    #[error("signing failed: {0}")]
    SigningFailure(String),

    /// The identity is not owned by the entry.
    #[error("identity is not owned by this entry")]
    UnknownIdentity,
}

impl From<serde_json::Error> for KeyringError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSerialization(err.to_string())
    }
}
