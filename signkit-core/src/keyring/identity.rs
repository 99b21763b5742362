//! Public key bundles and identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Signature algorithm of a key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Algorithm {
    /// Ed25519 (RFC 8032).
    Ed25519,
}

/// A public key tagged with its algorithm.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyBundle {
    /// Algorithm the key belongs to.
    pub algo: Algorithm,
    /// Raw public key bytes, hex encoded when serialized.
    #[serde(with = "hex")]
    pub data: Vec<u8>,
}

impl PublicKeyBundle {
    /// Creates a bundle from raw key bytes.
    #[must_use]
    pub const fn new(algo: Algorithm, data: Vec<u8>) -> Self {
        Self { algo, data }
    }
}

impl fmt::Debug for PublicKeyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algo, hex::encode(&self.data))
    }
}

/// An identity anyone may know about: just its public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicIdentity {
    /// The identity's public key.
    pub pubkey: PublicKeyBundle,
}

/// An identity whose private key is held by a keyring entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalIdentity {
    /// The identity's public key.
    pub pubkey: PublicKeyBundle,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LocalIdentity {
    /// Returns the public part of this identity.
    #[must_use]
    pub fn public(&self) -> PublicIdentity {
        PublicIdentity {
            pubkey: self.pubkey.clone(),
        }
    }
}

impl From<&LocalIdentity> for PublicIdentity {
    fn from(identity: &LocalIdentity) -> Self {
        identity.public()
    }
}

impl From<LocalIdentity> for PublicIdentity {
    fn from(identity: LocalIdentity) -> Self {
        Self {
            pubkey: identity.pubkey,
        }
    }
}

/// Opaque, stable identifier of a keyring entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyringEntryId(String);

impl KeyringEntryId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyringEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_string_forms() {
        assert_eq!(Algorithm::Ed25519.to_string(), "ed25519");
        assert_eq!("ed25519".parse::<Algorithm>().ok(), Some(Algorithm::Ed25519));
        assert_eq!(
            serde_json::to_string(&Algorithm::Ed25519).expect("serialize"),
            "\"ed25519\""
        );
    }

    #[test]
    fn test_local_identity_json_shape() {
        let identity = LocalIdentity {
            pubkey: PublicKeyBundle::new(Algorithm::Ed25519, vec![0xab, 0xcd]),
            label: None,
        };
        let json = serde_json::to_string(&identity).expect("serialize");
        assert_eq!(json, r#"{"pubkey":{"algo":"ed25519","data":"abcd"}}"#);

        let back: LocalIdentity = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, identity);
        assert_eq!(PublicIdentity::from(&back).pubkey, identity.pubkey);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        assert_ne!(KeyringEntryId::random(), KeyringEntryId::random());
    }
}
