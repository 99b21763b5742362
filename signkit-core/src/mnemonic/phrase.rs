//! Validated mnemonic phrases.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::codec;
use super::error::{FormatViolation, MnemonicError, MnemonicResult};
use super::seed::{mnemonic_to_seed, Seed};

/// A well-formed mnemonic phrase with a verified checksum.
///
/// The only ways to obtain one are [`Mnemonic::parse`] (or `str::parse`),
/// [`codec::encode`] and [`codec::generate`], so holding a `Mnemonic`
/// proves the phrase is canonical: lowercase words from the list, single
/// spaces, a supported word count and a matching checksum.
///
/// The phrase is kept in a [`SecretString`] and is redacted from `Debug`.
pub struct Mnemonic {
    phrase: SecretString,
    word_count: usize,
}

impl Mnemonic {
    /// Validates `input` and wraps it.
    ///
    /// Checks run in order and the first failure is returned:
    /// 1. format: no leading, trailing or repeated spaces, only `a`-`z`;
    /// 2. word count: 12, 15, 18, 21 or 24;
    /// 3. every word in the list and the checksum matches.
    ///
    /// # Errors
    ///
    /// [`MnemonicError::InvalidFormat`], [`MnemonicError::InvalidWordCount`]
    /// or [`MnemonicError::InvalidChecksum`], in that precedence.
    pub fn parse(input: &str) -> MnemonicResult<Self> {
        check_format(input).map_err(MnemonicError::InvalidFormat)?;

        let words: Vec<&str> = input.split(' ').collect();
        // Also checks the word count before touching the list.
        codec::entropy_from_words(&words)?;

        Ok(Self::from_validated(input.to_owned(), words.len()))
    }

    pub(crate) fn from_validated(phrase: String, word_count: usize) -> Self {
        Self {
            phrase: SecretString::from(phrase),
            word_count,
        }
    }

    /// Returns the phrase. Treat this as sensitive material.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.phrase.expose_secret()
    }

    /// Iterates over the words in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.as_str().split(' ')
    }

    /// Returns the number of words.
    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Recovers the entropy this phrase encodes.
    ///
    /// # Errors
    ///
    /// Cannot fail for a parsed phrase; the checksum is re-verified anyway.
    pub fn to_entropy(&self) -> MnemonicResult<Zeroizing<Vec<u8>>> {
        codec::decode(self)
    }

    /// Derives the 64-byte seed for this phrase and `passphrase`.
    #[must_use]
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        mnemonic_to_seed(self.as_str(), passphrase)
    }
}

impl FromStr for Mnemonic {
    type Err = MnemonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Clone for Mnemonic {
    fn clone(&self) -> Self {
        Self::from_validated(self.as_str().to_owned(), self.word_count)
    }
}

impl PartialEq for Mnemonic {
    fn eq(&self, other: &Self) -> bool {
        self.as_str().as_bytes().ct_eq(other.as_str().as_bytes()).into()
    }
}

impl Eq for Mnemonic {}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count)
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

fn check_format(input: &str) -> Result<(), FormatViolation> {
    if input.is_empty() {
        return Err(FormatViolation::Empty);
    }
    if input.starts_with(' ') {
        return Err(FormatViolation::LeadingSpace);
    }

    let mut previous_was_space = false;
    for (position, character) in input.char_indices() {
        match character {
            'a'..='z' => previous_was_space = false,
            ' ' if previous_was_space => {
                return Err(FormatViolation::RepeatedSpace { position });
            }
            ' ' => previous_was_space = true,
            _ => {
                return Err(FormatViolation::InvalidCharacter {
                    character,
                    position,
                })
            }
        }
    }

    if previous_was_space {
        return Err(FormatViolation::TrailingSpace);
    }
    Ok(())
}
