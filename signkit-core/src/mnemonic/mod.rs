//! Mnemonic phrases: wordlist, codec, validation and seed derivation.
//!
//! ```
//! use signkit_core::mnemonic::{self, Mnemonic};
//!
//! let phrase = mnemonic::encode(&[0u8; 16]).unwrap();
//! assert_eq!(
//!     phrase.as_str(),
//!     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
//! );
//!
//! let parsed: Mnemonic = phrase.as_str().parse().unwrap();
//! assert_eq!(parsed.to_entropy().unwrap().as_slice(), &[0u8; 16]);
//! let _seed = parsed.to_seed("");
//! ```

mod codec;
mod error;
mod phrase;
mod seed;
pub mod wordlist;

pub use codec::{decode, encode, generate, ENTROPY_LENGTHS, WORD_COUNTS};
pub use error::{ChecksumFailure, FormatViolation, MnemonicError, MnemonicResult};
pub use phrase::Mnemonic;
pub use seed::{
    mnemonic_to_seed, mnemonic_to_seed_default, Seed, PBKDF2_ROUNDS, SEED_SALT_PREFIX,
};
