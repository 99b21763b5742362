//! Keyrings: ordered collections of key-holding entries.
//!
//! A [`Keyring`] owns its entries as trait objects. Each entry serializes
//! itself; the keyring wraps those serializations in a versioned document
//! tagged with each entry's implementation id so it can be restored later.

mod ed25519;
mod entry;
mod error;
mod identity;

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use ed25519::{verify_signature, Ed25519Entry, ED25519_IMPLEMENTATION_ID};
pub use entry::{KeyringEntry, KeyringEntrySerialization};
pub use error::{KeyringError, KeyringResult};
pub use identity::{Algorithm, KeyringEntryId, LocalIdentity, PublicIdentity, PublicKeyBundle};

const FORMAT_VERSION: u32 = 1;

/// Serialized form of a whole keyring, private keys included.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyringSerialization(String);

impl KeyringSerialization {
    /// Wraps serialized keyring text.
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

impl fmt::Debug for KeyringSerialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyringSerialization([REDACTED])")
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyringDocument {
    format_version: u32,
    entries: Vec<EntryRecord>,
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct EntryRecord {
    #[zeroize(skip)]
    implementation_id: String,
    data: String,
}

/// Ordered set of keyring entries.
#[derive(Debug, Default)]
pub struct Keyring {
    entries: Vec<Box<dyn KeyringEntry>>,
}

impl Keyring {
    /// Creates an empty keyring.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` and returns its index.
    pub fn add(&mut self, entry: Box<dyn KeyringEntry>) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Returns the entries in insertion order.
    #[must_use]
    pub fn get_entries(&self) -> &[Box<dyn KeyringEntry>] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the keyring has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&dyn KeyringEntry> {
        self.entries.get(index).map(|entry| &**entry)
    }

    /// Returns the entry at `index` for modification.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut (dyn KeyringEntry + 'static)> {
        self.entries.get_mut(index).map(|entry| &mut **entry)
    }

    /// Finds an entry by id, returning its index too.
    #[must_use]
    pub fn entry_by_id(&self, id: &KeyringEntryId) -> Option<(usize, &dyn KeyringEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.id() == id)
            .map(|(index, entry)| (index, &**entry))
    }

    /// Serializes every entry, in order.
    ///
    /// # Errors
    ///
    /// Propagates entry serialization failures.
    pub fn serialize(&self) -> KeyringResult<KeyringSerialization> {
        let entries = self
            .entries
            .iter()
            .map(|entry| -> KeyringResult<EntryRecord> {
                let serialization = entry.serialize()?;
                Ok(EntryRecord {
                    implementation_id: entry.implementation_id().to_string(),
                    data: serialization.as_str().to_owned(),
                })
            })
            .collect::<KeyringResult<Vec<_>>>()?;

        let document = KeyringDocument {
            format_version: FORMAT_VERSION,
            entries,
        };
        Ok(KeyringSerialization::new(serde_json::to_string(&document)?))
    }

    /// Restores a keyring from [`Keyring::serialize`] output.
    ///
    /// # Errors
    ///
    /// [`KeyringError::InvalidSerialization`] on a version mismatch, an
    /// unknown implementation id or any malformed entry.
    pub fn deserialize(serialization: &KeyringSerialization) -> KeyringResult<Self> {
        let document: KeyringDocument = serde_json::from_str(serialization.as_str())?;
        if document.format_version != FORMAT_VERSION {
            return Err(KeyringError::InvalidSerialization(format!(
                "unsupported keyring version {}",
                document.format_version
            )));
        }

        let entries = document
            .entries
            .iter()
            .map(deserialize_entry)
            .collect::<KeyringResult<Vec<_>>>()?;
        log::debug!("restored keyring with {} entries", entries.len());
        Ok(Self { entries })
    }
}

fn deserialize_entry(record: &EntryRecord) -> KeyringResult<Box<dyn KeyringEntry>> {
    let serialization = KeyringEntrySerialization::new(record.data.clone());
    match record.implementation_id.as_str() {
        ED25519_IMPLEMENTATION_ID => Ok(Box::new(Ed25519Entry::deserialize(&serialization)?)),
        other => Err(KeyringError::InvalidSerialization(format!(
            "unknown keyring entry implementation {other:?}"
        ))),
    }
}
