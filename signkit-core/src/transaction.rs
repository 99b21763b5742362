//! Transactions, signing jobs and signatures.
//!
//! The wire encoding of a transaction is chain specific and lives outside
//! this crate behind [`TxCodec`]. The profile only needs the bytes to sign
//! and the chain the transaction targets.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};

use crate::keyring::PublicKeyBundle;

/// Chain namespace a transaction (and therefore its signature) belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Wraps a chain id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the chain id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Per-signer anti-replay counter bound into the signed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(pub u64);

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How signing bytes are hashed before they reach the signature primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrehashType {
    /// Sign the bytes as they are.
    #[default]
    None,
    /// Sign `SHA-256(bytes)`.
    Sha256,
    /// Sign `SHA-512(bytes)`.
    Sha512,
}

/// Bytes a codec wants signed, plus how to prehash them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningJob {
    /// Canonical signing bytes produced by the codec.
    pub bytes: Vec<u8>,
    /// Hash applied before signing.
    pub prehash: PrehashType,
}

impl SigningJob {
    /// A job that signs `bytes` without prehashing.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            prehash: PrehashType::None,
        }
    }

    /// A job with an explicit prehash.
    #[must_use]
    pub const fn with_prehash(bytes: Vec<u8>, prehash: PrehashType) -> Self {
        Self { bytes, prehash }
    }

    /// Returns the message handed to the signature primitive.
    #[must_use]
    pub fn message(&self) -> Vec<u8> {
        match self.prehash {
            PrehashType::None => self.bytes.clone(),
            PrehashType::Sha256 => Sha256::digest(&self.bytes).to_vec(),
            PrehashType::Sha512 => Sha512::digest(&self.bytes).to_vec(),
        }
    }
}

/// Raw signature bytes as produced by a keyring entry.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureBytes(#[serde(with = "hex")] Vec<u8>);

impl SignatureBytes {
    /// Wraps raw signature bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SignatureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignatureBytes({})", hex::encode(&self.0))
    }
}

/// A signature bound to the signer's key and the nonce it signed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullSignature {
    /// Nonce used when computing the signed bytes.
    pub nonce: Nonce,
    /// Public key of the signer.
    pub pubkey: PublicKeyBundle,
    /// The signature itself.
    pub signature: SignatureBytes,
}

/// A transaction with one primary signature and any number of co-signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction<T> {
    /// The unsigned transaction.
    pub transaction: T,
    /// The first signature.
    pub primary_signature: FullSignature,
    /// Co-signatures in the order they were added.
    pub other_signatures: Vec<FullSignature>,
}

impl<T> SignedTransaction<T> {
    /// Creates a transaction carrying only its primary signature.
    #[must_use]
    pub const fn new(transaction: T, primary_signature: FullSignature) -> Self {
        Self {
            transaction,
            primary_signature,
            other_signatures: Vec::new(),
        }
    }

    /// Returns a copy with `signature` appended to the co-signatures.
    #[must_use]
    pub fn with_signature(&self, signature: FullSignature) -> Self
    where
        T: Clone,
    {
        let mut other_signatures = Vec::with_capacity(self.other_signatures.len() + 1);
        other_signatures.extend(self.other_signatures.iter().cloned());
        other_signatures.push(signature);
        Self {
            transaction: self.transaction.clone(),
            primary_signature: self.primary_signature.clone(),
            other_signatures,
        }
    }

    /// Iterates over all signatures, primary first.
    pub fn signatures(&self) -> impl Iterator<Item = &FullSignature> {
        std::iter::once(&self.primary_signature).chain(self.other_signatures.iter())
    }
}

/// A transaction that can be signed.
pub trait UnsignedTransaction {
    /// Chain the transaction targets.
    fn chain_id(&self) -> &ChainId;
}

/// Chain-specific encoder producing the bytes a signer commits to.
///
/// Implementations must be deterministic: the same transaction and nonce
/// always yield the same job. The chain id is expected to be part of the
/// encoded bytes.
pub trait TxCodec<T> {
    /// Returns the signing job for `transaction` at `nonce`.
    fn bytes_to_sign(&self, transaction: &T, nonce: Nonce) -> SigningJob;
}
