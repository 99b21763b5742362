//! Mnemonic → seed derivation (PBKDF2-HMAC-SHA512).
//!
//! This is a pure key-derivation step, not a validator: any UTF-8 text is
//! accepted, including the empty string and malformed phrases. Callers who
//! need a well-formed phrase go through [`Mnemonic::parse`] first.
//!
//! [`Mnemonic::parse`]: super::Mnemonic::parse

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Constant prefixed to the passphrase to form the salt.
pub const SEED_SALT_PREFIX: &str = "mnemonic";

const SEED_LEN: usize = 64;

/// 64-byte seed, zeroized on drop.
///
/// Not `Clone`; `Debug` prints a placeholder.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Seed length in bytes.
    pub const LEN: usize = SEED_LEN;

    /// Wraps raw seed bytes, e.g. from a test vector.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the seed bytes. Treat this as sensitive material.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Derives a seed from `mnemonic` and `passphrase`.
///
/// Both inputs are NFKD-normalized before hashing; the salt is
/// `"mnemonic" ‖ passphrase`. Deterministic and total.
#[must_use]
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Seed {
    let password: Zeroizing<String> = Zeroizing::new(mnemonic.nfkd().collect());

    let mut salt = Zeroizing::new(String::with_capacity(
        SEED_SALT_PREFIX.len() + passphrase.len(),
    ));
    salt.push_str(SEED_SALT_PREFIX);
    salt.extend(passphrase.nfkd());

    let mut seed = Seed([0u8; Seed::LEN]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut seed.0);
    seed
}

/// [`mnemonic_to_seed`] with the empty passphrase.
#[must_use]
pub fn mnemonic_to_seed_default(mnemonic: &str) -> Seed {
    mnemonic_to_seed(mnemonic, "")
}
