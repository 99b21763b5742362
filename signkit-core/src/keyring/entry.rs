use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::KeyringResult;
use super::identity::{KeyringEntryId, LocalIdentity, PublicIdentity};
use crate::transaction::{ChainId, SignatureBytes, SigningJob};

/// Serialized form of a single keyring entry.
///
/// The text is owned by the entry implementation and contains private key
/// material; it is wiped on drop and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyringEntrySerialization(String);

impl KeyringEntrySerialization {
    /// Wraps serialized entry text.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self(text)
    }

    /// Returns the serialized text. Treat this as sensitive material.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyringEntrySerialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyringEntrySerialization([REDACTED])")
    }
}

/// A group of identities sharing one key-management strategy.
///
/// Implementations hold private keys and never expose them except through
/// [`serialize`](KeyringEntry::serialize).
pub trait KeyringEntry: fmt::Debug + Send + Sync {
    /// Stable identifier of the implementation, used to pick the
    /// deserializer when a keyring is loaded.
    fn implementation_id(&self) -> &'static str;

    /// Identifier of this entry, stable across serialization.
    fn id(&self) -> &KeyringEntryId;

    /// Human-readable label, if any.
    fn label(&self) -> Option<&str>;

    /// Sets or clears the label.
    fn set_label(&mut self, label: Option<String>);

    /// Whether this entry holds private keys and can sign.
    fn can_sign(&self) -> bool;

    /// Creates a new identity and returns it.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn create_identity(&mut self) -> KeyringResult<LocalIdentity>;

    /// Returns all identities in creation order.
    fn get_identities(&self) -> Vec<LocalIdentity>;

    /// Sets or clears the label of one identity.
    ///
    /// # Errors
    ///
    /// [`KeyringError::UnknownIdentity`](super::KeyringError::UnknownIdentity)
    /// if this entry does not own `identity`.
    fn set_identity_label(
        &mut self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> KeyringResult<()>;

    /// Signs `job` with the key of `identity` for `chain_id`.
    ///
    /// # Errors
    ///
    /// [`KeyringError::SigningFailure`](super::KeyringError::SigningFailure)
    /// if the identity is unknown or the job cannot be signed.
    fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        job: &SigningJob,
        chain_id: &ChainId,
    ) -> KeyringResult<SignatureBytes>;

    /// Serializes the entry, private keys included.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn serialize(&self) -> KeyringResult<KeyringEntrySerialization>;
}
