//! Keyring entry holding independent random Ed25519 keys.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::entry::{KeyringEntry, KeyringEntrySerialization};
use super::error::{KeyringError, KeyringResult};
use super::identity::{Algorithm, KeyringEntryId, LocalIdentity, PublicIdentity, PublicKeyBundle};
use crate::transaction::{ChainId, SignatureBytes, SigningJob};

/// Implementation id written next to serialized [`Ed25519Entry`] values.
pub const ED25519_IMPLEMENTATION_ID: &str = "ed25519";

const FORMAT_VERSION: u32 = 1;

struct Ed25519Identity {
    local: LocalIdentity,
    signing_key: SigningKey,
}

impl Ed25519Identity {
    fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let local = LocalIdentity {
            pubkey: PublicKeyBundle::new(
                Algorithm::Ed25519,
                signing_key.verifying_key().to_bytes().to_vec(),
            ),
            label: None,
        };
        Self { local, signing_key }
    }

    fn matches(&self, identity: &PublicIdentity) -> bool {
        self.local.pubkey == identity.pubkey
    }
}

/// An entry whose identities each own an unrelated random Ed25519 key.
///
/// Keys are wiped when the entry is dropped.
pub struct Ed25519Entry {
    id: KeyringEntryId,
    label: Option<String>,
    identities: Vec<Ed25519Identity>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryDocument {
    format_version: u32,
    id: KeyringEntryId,
    #[serde(default)]
    label: Option<String>,
    identities: Vec<IdentityDocument>,
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct IdentityDocument {
    #[zeroize(skip)]
    local_identity: LocalIdentity,
    privkey: String,
}

impl Ed25519Entry {
    /// Creates an empty entry with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: KeyringEntryId::random(),
            label: None,
            identities: Vec::new(),
        }
    }

    /// Restores an entry from [`KeyringEntry::serialize`] output.
    ///
    /// # Errors
    ///
    /// [`KeyringError::InvalidSerialization`] if the text is malformed, has
    /// another format version, or a stored public key does not belong to
    /// its private key.
    pub fn deserialize(serialization: &KeyringEntrySerialization) -> KeyringResult<Self> {
        let document: EntryDocument = serde_json::from_str(serialization.as_str())?;
        if document.format_version != FORMAT_VERSION {
            return Err(KeyringError::InvalidSerialization(format!(
                "unsupported ed25519 entry version {}",
                document.format_version
            )));
        }

        let identities = document
            .identities
            .iter()
            .map(restore_identity)
            .collect::<KeyringResult<Vec<_>>>()?;

        Ok(Self {
            id: document.id,
            label: document.label,
            identities,
        })
    }

    fn find(&self, identity: &PublicIdentity) -> Option<&Ed25519Identity> {
        self.identities.iter().find(|local| local.matches(identity))
    }
}

impl Default for Ed25519Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ed25519Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Entry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("identities", &self.identities.len())
            .finish()
    }
}

fn restore_identity(document: &IdentityDocument) -> KeyringResult<Ed25519Identity> {
    if document.local_identity.pubkey.algo != Algorithm::Ed25519 {
        return Err(KeyringError::InvalidSerialization(format!(
            "unexpected algorithm {}",
            document.local_identity.pubkey.algo
        )));
    }

    let bytes = Zeroizing::new(
        hex::decode(&document.privkey)
            .map_err(|err| KeyringError::InvalidSerialization(format!("privkey: {err}")))?,
    );
    let secret: Zeroizing<[u8; SECRET_KEY_LENGTH]> =
        Zeroizing::new(bytes.as_slice().try_into().map_err(|_| {
            KeyringError::InvalidSerialization(format!(
                "privkey must be {SECRET_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?);
    let signing_key = SigningKey::from_bytes(&secret);

    let derived = signing_key.verifying_key();
    let stored = document.local_identity.pubkey.data.as_slice();
    if !bool::from(derived.as_bytes().as_slice().ct_eq(stored)) {
        return Err(KeyringError::InvalidSerialization(
            "stored public key does not match private key".to_string(),
        ));
    }

    Ok(Ed25519Identity {
        local: document.local_identity.clone(),
        signing_key,
    })
}

impl KeyringEntry for Ed25519Entry {
    fn implementation_id(&self) -> &'static str {
        ED25519_IMPLEMENTATION_ID
    }

    fn id(&self) -> &KeyringEntryId {
        &self.id
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    fn can_sign(&self) -> bool {
        true
    }

    fn create_identity(&mut self) -> KeyringResult<LocalIdentity> {
        let identity = Ed25519Identity::generate();
        let local = identity.local.clone();
        self.identities.push(identity);
        log::debug!(
            "entry {} created identity #{}",
            self.id,
            self.identities.len() - 1
        );
        Ok(local)
    }

    fn get_identities(&self) -> Vec<LocalIdentity> {
        self.identities
            .iter()
            .map(|identity| identity.local.clone())
            .collect()
    }

    fn set_identity_label(
        &mut self,
        identity: &PublicIdentity,
        label: Option<String>,
    ) -> KeyringResult<()> {
        let local = self
            .identities
            .iter_mut()
            .find(|local| local.matches(identity))
            .ok_or(KeyringError::UnknownIdentity)?;
        local.local.label = label;
        Ok(())
    }

    fn create_transaction_signature(
        &self,
        identity: &PublicIdentity,
        job: &SigningJob,
        chain_id: &ChainId,
    ) -> KeyringResult<SignatureBytes> {
        if chain_id.as_str().is_empty() {
            return Err(KeyringError::SigningFailure(
                "chain id must not be empty".to_string(),
            ));
        }
        let signer = self.find(identity).ok_or_else(|| {
            KeyringError::SigningFailure(format!("identity not found in entry {}", self.id))
        })?;

        let signature = signer.signing_key.sign(&job.message());
        log::debug!("entry {} signed a job for chain {chain_id}", self.id);
        Ok(SignatureBytes::new(signature.to_bytes().to_vec()))
    }

    fn serialize(&self) -> KeyringResult<KeyringEntrySerialization> {
        let identities = self
            .identities
            .iter()
            .map(|identity| {
                let secret = Zeroizing::new(identity.signing_key.to_bytes());
                IdentityDocument {
                    local_identity: identity.local.clone(),
                    privkey: hex::encode(secret.as_slice()),
                }
            })
            .collect();
        let document = EntryDocument {
            format_version: FORMAT_VERSION,
            id: self.id.clone(),
            label: self.label.clone(),
            identities,
        };
        Ok(KeyringEntrySerialization::new(serde_json::to_string(
            &document,
        )?))
    }
}

/// Checks `signature` over `job` against `pubkey`.
///
/// Applies the same prehash as signing. Malformed keys or signatures
/// verify as `false`.
#[must_use]
pub fn verify_signature(
    pubkey: &PublicKeyBundle,
    job: &SigningJob,
    signature: &SignatureBytes,
) -> bool {
    match pubkey.algo {
        Algorithm::Ed25519 => {
            let Ok(key_bytes) = <[u8; 32]>::try_from(pubkey.data.as_slice()) else {
                return false;
            };
            let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
                return false;
            };
            let Ok(signature) = Signature::from_slice(signature.as_bytes()) else {
                return false;
            };
            key.verify_strict(&job.message(), &signature).is_ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::PrehashType;
    use test_case::test_case;

    fn chain() -> ChainId {
        ChainId::new("test-chain")
    }

    fn tamper(
        serialization: &KeyringEntrySerialization,
        edit: impl FnOnce(&mut serde_json::Value),
    ) -> KeyringEntrySerialization {
        let mut value: serde_json::Value =
            serde_json::from_str(serialization.as_str()).expect("valid json");
        edit(&mut value);
        KeyringEntrySerialization::new(value.to_string())
    }

    fn expect_invalid(serialization: &KeyringEntrySerialization) {
        match Ed25519Entry::deserialize(serialization) {
            Err(KeyringError::InvalidSerialization(_)) => {}
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_identities_are_independent_and_ordered() {
        let mut entry = Ed25519Entry::new();
        let first = entry.create_identity().expect("identity");
        let second = entry.create_identity().expect("identity");

        assert_ne!(first.pubkey, second.pubkey);
        assert_eq!(first.pubkey.data.len(), 32);
        assert_eq!(entry.get_identities(), vec![first, second]);
        assert!(entry.can_sign());
        assert_eq!(entry.implementation_id(), ED25519_IMPLEMENTATION_ID);
    }

    #[test]
    fn test_identity_labels() {
        let mut entry = Ed25519Entry::new();
        let identity = entry.create_identity().expect("identity");

        entry
            .set_identity_label(&identity.public(), Some("main".to_string()))
            .expect("label");
        assert_eq!(entry.get_identities()[0].label.as_deref(), Some("main"));

        entry
            .set_identity_label(&identity.public(), None)
            .expect("clear label");
        assert_eq!(entry.get_identities()[0].label, None);

        let stranger = Ed25519Entry::new().create_identity().expect("identity");
        assert_eq!(
            entry.set_identity_label(&stranger.public(), None),
            Err(KeyringError::UnknownIdentity)
        );
    }

    #[test_case(PrehashType::None ; "raw")]
    #[test_case(PrehashType::Sha256 ; "sha256")]
    #[test_case(PrehashType::Sha512 ; "sha512")]
    fn test_sign_and_verify(prehash: PrehashType) {
        let mut entry = Ed25519Entry::new();
        let identity = entry.create_identity().expect("identity");
        let job = SigningJob::with_prehash(b"transfer 10 to bob".to_vec(), prehash);

        let signature = entry
            .create_transaction_signature(&identity.public(), &job, &chain())
            .expect("signature");
        assert_eq!(signature.as_bytes().len(), 64);
        assert!(verify_signature(&identity.pubkey, &job, &signature));

        let other = SigningJob::with_prehash(b"transfer 11 to bob".to_vec(), prehash);
        assert!(!verify_signature(&identity.pubkey, &other, &signature));
    }

    #[test]
    fn test_verify_rejects_malformed_inputs() {
        let mut entry = Ed25519Entry::new();
        let identity = entry.create_identity().expect("identity");
        let job = SigningJob::new(b"payload".to_vec());
        let signature = entry
            .create_transaction_signature(&identity.public(), &job, &chain())
            .expect("signature");

        let short_key = PublicKeyBundle::new(Algorithm::Ed25519, vec![1; 31]);
        assert!(!verify_signature(&short_key, &job, &signature));

        let short_signature = SignatureBytes::new(signature.as_bytes()[..63].to_vec());
        assert!(!verify_signature(&identity.pubkey, &job, &short_signature));
    }

    #[test]
    fn test_signing_failures() {
        let mut entry = Ed25519Entry::new();
        let identity = entry.create_identity().expect("identity");
        let job = SigningJob::new(b"payload".to_vec());

        match entry.create_transaction_signature(&identity.public(), &job, &ChainId::new("")) {
            Err(KeyringError::SigningFailure(reason)) => assert!(reason.contains("chain id")),
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("expected error"),
        }

        let stranger = Ed25519Entry::new().create_identity().expect("identity");
        match entry.create_transaction_signature(&stranger.public(), &job, &chain()) {
            Err(KeyringError::SigningFailure(_)) => {}
            Err(err) => panic!("unexpected error: {err}"),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut entry = Ed25519Entry::new();
        entry.set_label(Some("savings".to_string()));
        let identity = entry.create_identity().expect("identity");
        entry
            .set_identity_label(&identity.public(), Some("cold".to_string()))
            .expect("label");
        entry.create_identity().expect("identity");

        let serialization = entry.serialize().expect("serialize");
        let restored = Ed25519Entry::deserialize(&serialization).expect("deserialize");

        assert_eq!(restored.id(), entry.id());
        assert_eq!(restored.label(), Some("savings"));
        assert_eq!(restored.get_identities(), entry.get_identities());

        // Ed25519 is deterministic, so identical keys give identical signatures.
        let job = SigningJob::new(b"payload".to_vec());
        let before = entry
            .create_transaction_signature(&identity.public(), &job, &chain())
            .expect("signature");
        let after = restored
            .create_transaction_signature(&identity.public(), &job, &chain())
            .expect("signature");
        assert_eq!(before, after);
    }

    #[test]
    fn test_version_mismatch() {
        let serialization = Ed25519Entry::new().serialize().expect("serialize");
        let tampered = tamper(&serialization, |value| {
            value["formatVersion"] = serde_json::json!(FORMAT_VERSION + 1);
        });
        expect_invalid(&tampered);
    }

    #[test]
    fn test_corrupted_private_keys() {
        let mut entry = Ed25519Entry::new();
        entry.create_identity().expect("identity");
        let serialization = entry.serialize().expect("serialize");

        expect_invalid(&tamper(&serialization, |value| {
            value["identities"][0]["privkey"] = serde_json::json!("zz");
        }));
        expect_invalid(&tamper(&serialization, |value| {
            value["identities"][0]["privkey"] = serde_json::json!("0011");
        }));
        expect_invalid(&tamper(&serialization, |value| {
            value["identities"][0]["localIdentity"]["pubkey"]["data"] =
                serde_json::json!(hex::encode([7u8; 32]));
        }));
        expect_invalid(&KeyringEntrySerialization::new("not json".to_string()));
    }

    #[test]
    fn test_debug_hides_keys() {
        let mut entry = Ed25519Entry::new();
        entry.create_identity().expect("identity");
        let serialization = entry.serialize().expect("serialize");

        assert!(format!("{entry:?}").contains("identities: 1"));
        assert_eq!(
            format!("{serialization:?}"),
            "KeyringEntrySerialization([REDACTED])"
        );
    }
}
