#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![doc = include_str!("../../README.md")]

pub mod keyring;
pub mod logger;
pub mod mnemonic;

mod profile;
pub use profile::*;

mod transaction;
pub use transaction::*;

pub use keyring::{
    verify_signature, Ed25519Entry, Keyring, KeyringEntry, KeyringError, LocalIdentity,
    PublicIdentity, PublicKeyBundle,
};
pub use mnemonic::{Mnemonic, MnemonicError, Seed};
