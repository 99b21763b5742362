use std::fmt;

use thiserror::Error;

/// Result type for mnemonic operations.
pub type MnemonicResult<T> = Result<T, MnemonicError>;

/// Errors raised while encoding, decoding or validating mnemonics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MnemonicError {
    /// Entropy length is not one of 16, 20, 24, 28 or 32 bytes.
    #[error("invalid entropy length: expected 16, 20, 24, 28 or 32 bytes, got {actual}")]
    InvalidLength {
        /// Observed length in bytes.
        actual: usize,
    },

    /// The phrase violates the spacing or character rules.
    #[error("invalid mnemonic format: {0}")]
    InvalidFormat(FormatViolation),

    /// Word count is not one of 12, 15, 18, 21 or 24.
    #[error("invalid word count: expected 12, 15, 18, 21 or 24 words, got {actual}")]
    InvalidWordCount {
        /// Observed number of words.
        actual: usize,
    },

    /// A word is unknown or the checksum bits do not match the entropy.
    #[error("invalid mnemonic checksum: {0}")]
    InvalidChecksum(ChecksumFailure),
}

/// Which formatting rule a phrase broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatViolation {
    /// The phrase is empty.
    Empty,
    /// The phrase starts with a space.
    LeadingSpace,
    /// The phrase ends with a space.
    TrailingSpace,
    /// Two or more consecutive spaces starting at this byte offset.
    RepeatedSpace {
        /// Byte offset of the first extra space.
        position: usize,
    },
    /// A character outside `a`-`z` and the separating space.
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Byte offset of the character.
        position: usize,
    },
}

impl fmt::Display for FormatViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("phrase is empty"),
            Self::LeadingSpace => f.write_str("leading space"),
            Self::TrailingSpace => f.write_str("trailing space"),
            Self::RepeatedSpace { position } => {
                write!(f, "repeated space at byte {position}")
            }
            Self::InvalidCharacter {
                character,
                position,
            } => write!(
                f,
                "invalid character {character:?} at byte {position}, only a-z allowed"
            ),
        }
    }
}

/// Why checksum verification failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumFailure {
    /// A word is not in the wordlist.
    UnknownWord(String),
    /// The embedded checksum bits differ from the recomputed ones.
    Mismatch {
        /// Checksum recomputed from the entropy bits.
        expected: u8,
        /// Checksum carried by the phrase.
        found: u8,
    },
}

impl fmt::Display for ChecksumFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWord(word) => write!(f, "word {word:?} is not in the wordlist"),
            Self::Mismatch { expected, found } => {
                write!(f, "expected checksum {expected:#04x}, found {found:#04x}")
            }
        }
    }
}
