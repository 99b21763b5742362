//! Entropy ↔ mnemonic conversion.
//!
//! The bit layout is `entropy ‖ SHA-256(entropy)[..cs]` where
//! `cs = entropy_bits / 32`, read MSB first in 11-bit groups. Each group
//! indexes the wordlist.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::error::{ChecksumFailure, MnemonicError, MnemonicResult};
use super::phrase::Mnemonic;
use super::wordlist;

/// Accepted entropy lengths in bytes.
pub const ENTROPY_LENGTHS: [usize; 5] = [16, 20, 24, 28, 32];

/// Accepted mnemonic word counts.
pub const WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

const BITS_PER_WORD: usize = 11;

/// Encodes `entropy` as a mnemonic phrase.
///
/// # Errors
///
/// Returns [`MnemonicError::InvalidLength`] unless `entropy` is 16, 20, 24,
/// 28 or 32 bytes long.
pub fn encode(entropy: &[u8]) -> MnemonicResult<Mnemonic> {
    if !ENTROPY_LENGTHS.contains(&entropy.len()) {
        return Err(MnemonicError::InvalidLength {
            actual: entropy.len(),
        });
    }

    let checksum_bits = entropy.len() * 8 / 32;
    let word_count = (entropy.len() * 8 + checksum_bits) / BITS_PER_WORD;

    // Checksum is at most 8 bits, so one hash byte is enough.
    let mut bits = Zeroizing::new(Vec::with_capacity(entropy.len() + 1));
    bits.extend_from_slice(entropy);
    bits.push(Sha256::digest(entropy)[0]);

    let table = wordlist::words();
    let words: Vec<&str> = (0..word_count)
        .map(|position| table[usize::from(read_group(&bits, position))])
        .collect();

    Ok(Mnemonic::from_validated(words.join(" "), word_count))
}

/// Recovers the entropy carried by `mnemonic`, re-verifying its checksum.
///
/// # Errors
///
/// Returns [`MnemonicError::InvalidChecksum`] if the checksum bits do not
/// match the entropy.
pub fn decode(mnemonic: &Mnemonic) -> MnemonicResult<Zeroizing<Vec<u8>>> {
    let words: Vec<&str> = mnemonic.words().collect();
    entropy_from_words(&words)
}

/// Generates a fresh random mnemonic with `word_count` words.
///
/// # Errors
///
/// Returns [`MnemonicError::InvalidWordCount`] for unsupported counts.
pub fn generate(word_count: usize) -> MnemonicResult<Mnemonic> {
    if !WORD_COUNTS.contains(&word_count) {
        return Err(MnemonicError::InvalidWordCount { actual: word_count });
    }
    let mut entropy = Zeroizing::new(vec![0u8; word_count * 4 / 3]);
    OsRng.fill_bytes(&mut entropy);
    encode(&entropy)
}

/// Rebuilds entropy from words and checks the embedded checksum.
///
/// Word count is checked first, then wordlist membership, then the checksum.
pub(crate) fn entropy_from_words(words: &[&str]) -> MnemonicResult<Zeroizing<Vec<u8>>> {
    if !WORD_COUNTS.contains(&words.len()) {
        return Err(MnemonicError::InvalidWordCount {
            actual: words.len(),
        });
    }

    let total_bits = words.len() * BITS_PER_WORD;
    let checksum_bits = total_bits / 33;
    let entropy_len = (total_bits - checksum_bits) / 8;

    let mut bits = Zeroizing::new(vec![0u8; total_bits.div_ceil(8)]);
    for (position, word) in words.iter().enumerate() {
        let index = wordlist::index_of(word).ok_or_else(|| {
            MnemonicError::InvalidChecksum(ChecksumFailure::UnknownWord((*word).to_string()))
        })?;
        write_group(&mut bits, position, index);
    }

    let entropy = Zeroizing::new(bits[..entropy_len].to_vec());
    let found = bits[entropy_len] >> (8 - checksum_bits);
    let expected = Sha256::digest(entropy.as_slice())[0] >> (8 - checksum_bits);

    if bool::from(expected.ct_eq(&found)) {
        Ok(entropy)
    } else {
        Err(MnemonicError::InvalidChecksum(ChecksumFailure::Mismatch {
            expected,
            found,
        }))
    }
}

fn read_group(bits: &[u8], position: usize) -> u16 {
    (0..BITS_PER_WORD).fold(0u16, |index, offset| {
        let bit = position * BITS_PER_WORD + offset;
        (index << 1) | u16::from((bits[bit / 8] >> (7 - bit % 8)) & 1)
    })
}

fn write_group(bits: &mut [u8], position: usize, index: u16) {
    for offset in 0..BITS_PER_WORD {
        if (index >> (BITS_PER_WORD - 1 - offset)) & 1 == 1 {
            let bit = position * BITS_PER_WORD + offset;
            bits[bit / 8] |= 1 << (7 - bit % 8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("00000000000000000000000000000000", "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about" ; "all zero 128")]
    #[test_case("7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f7f", "legal winner thank year wave sausage worth useful legal winner thank yellow" ; "all 7f 128")]
    #[test_case("80808080808080808080808080808080", "letter advice cage absurd amount doctor acoustic avoid letter advice cage above" ; "all 80 128")]
    #[test_case("ffffffffffffffffffffffffffffffff", "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong" ; "all ff 128")]
    #[test_case("000000000000000000000000000000000000000000000000", "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon agent" ; "all zero 192")]
    #[test_case("0000000000000000000000000000000000000000000000000000000000000000", "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon art" ; "all zero 256")]
    #[test_case("ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff", "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo vote" ; "all ff 256")]
    fn test_known_vectors(entropy_hex: &str, phrase: &str) {
        let entropy = hex::decode(entropy_hex).expect("hex");
        let mnemonic = encode(&entropy).expect("encode");
        assert_eq!(mnemonic.as_str(), phrase);

        let parsed = Mnemonic::parse(phrase).expect("parse");
        assert_eq!(decode(&parsed).expect("decode").as_slice(), entropy.as_slice());
    }

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(15)]
    #[test_case(17)]
    #[test_case(23)]
    #[test_case(25)]
    #[test_case(33)]
    fn test_rejects_bad_entropy_length(len: usize) {
        assert_eq!(
            encode(&vec![0u8; len]).map(|m| m.word_count()),
            Err(MnemonicError::InvalidLength { actual: len })
        );
    }

    #[test]
    fn test_round_trip_every_length() {
        for len in ENTROPY_LENGTHS {
            let entropy: Vec<u8> = (0..len)
                .map(|i| u8::try_from(i).expect("small").wrapping_mul(37).wrapping_add(11))
                .collect();
            let mnemonic = encode(&entropy).expect("encode");
            assert_eq!(mnemonic.word_count(), len * 3 / 4);
            assert_eq!(decode(&mnemonic).expect("decode").as_slice(), entropy.as_slice());
        }
    }

    // Entropy chosen so that no single flipped entropy bit maps onto the
    // same checksum; flipped checksum bits always fail.
    #[test_case("a5c1e93a157c1abb2e56e31a58392a28" ; "12 words")]
    #[test_case("5883eb3b084f91ecd843048347b642d43d87815d48470e2237738b1ab432f84d" ; "24 words")]
    fn test_any_flipped_bit_breaks_checksum(entropy_hex: &str) {
        let entropy = hex::decode(entropy_hex).expect("hex");
        let mnemonic = encode(&entropy).expect("encode");
        let words: Vec<&str> = mnemonic.words().collect();
        let indices: Vec<u16> = words
            .iter()
            .map(|word| wordlist::index_of(word).expect("known word"))
            .collect();

        for position in 0..indices.len() {
            for bit in 0..BITS_PER_WORD {
                let mut corrupted: Vec<&str> = words.clone();
                let flipped = indices[position] ^ (1 << bit);
                corrupted[position] = wordlist::word(flipped).expect("in range");
                match entropy_from_words(&corrupted) {
                    Err(MnemonicError::InvalidChecksum(ChecksumFailure::Mismatch { .. })) => {}
                    other => panic!("word {position} bit {bit}: unexpected {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_generate_produces_valid_phrases() {
        for count in WORD_COUNTS {
            let mnemonic = generate(count).expect("generate");
            assert_eq!(mnemonic.word_count(), count);
            Mnemonic::parse(mnemonic.as_str()).expect("generated phrase validates");
        }
        assert!(matches!(
            generate(13),
            Err(MnemonicError::InvalidWordCount { actual: 13 })
        ));
    }
}
