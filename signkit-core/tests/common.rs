//! Common test utilities shared across integration tests.

#![allow(dead_code, missing_docs)]

use signkit_core::{ChainId, Nonce, SigningJob, TxCodec, UnsignedTransaction};

/// A minimal token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub chain_id: ChainId,
    pub recipient: String,
    pub amount: u64,
}

impl Transfer {
    pub fn new(chain: &str, recipient: &str, amount: u64) -> Self {
        Self {
            chain_id: ChainId::new(chain),
            recipient: recipient.to_string(),
            amount,
        }
    }
}

impl UnsignedTransaction for Transfer {
    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }
}

/// Length-prefixed encoding of chain id, nonce, recipient and amount.
pub struct TransferCodec;

impl TxCodec<Transfer> for TransferCodec {
    fn bytes_to_sign(&self, tx: &Transfer, nonce: Nonce) -> SigningJob {
        let mut bytes = Vec::new();
        for field in [tx.chain_id.as_str(), tx.recipient.as_str()] {
            let len = u32::try_from(field.len()).expect("short field");
            bytes.extend_from_slice(&len.to_be_bytes());
            bytes.extend_from_slice(field.as_bytes());
        }
        bytes.extend_from_slice(&nonce.0.to_be_bytes());
        bytes.extend_from_slice(&tx.amount.to_be_bytes());
        SigningJob::new(bytes)
    }
}

pub fn temp_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("signkit-core-")
        .tempdir()
        .expect("create temp dir")
}
