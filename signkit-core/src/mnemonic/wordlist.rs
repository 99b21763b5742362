//! The BIP-39 English wordlist.
//!
//! 2048 unique lowercase ASCII words in ascending order. Word `i` encodes
//! the 11-bit value `i`.

use bip39::Language;

/// Number of words in the list (2^11).
pub const WORDLIST_LEN: usize = 2048;

/// Returns the full ordered table.
#[must_use]
pub fn words() -> &'static [&'static str; WORDLIST_LEN] {
    Language::English.word_list()
}

/// Returns the word encoding `index`, or `None` if `index >= 2048`.
#[must_use]
pub fn word(index: u16) -> Option<&'static str> {
    words().get(usize::from(index)).copied()
}

/// Returns the index of `word`, or `None` if it is not in the list.
///
/// Matching is exact: no case folding, no prefix matching. The list is
/// sorted, so this is a binary search.
#[must_use]
pub fn index_of(word: &str) -> Option<u16> {
    Language::English.find_word(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let table = words();
        assert_eq!(table.len(), WORDLIST_LEN);
        assert_eq!(table[0], "abandon");
        assert_eq!(table[3], "about");
        assert_eq!(table[WORDLIST_LEN - 1], "zoo");
    }

    #[test]
    fn test_table_is_sorted_unique_lowercase() {
        let table = words();
        assert!(table.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(table
            .iter()
            .all(|word| word.bytes().all(|byte| byte.is_ascii_lowercase())));
    }

    #[test]
    fn test_lookup_round_trip() {
        for index in [0_u16, 1, 3, 1024, 2047] {
            let word = word(index).expect("index in range");
            assert_eq!(index_of(word), Some(index));
        }
        assert_eq!(word(2048), None);
        assert_eq!(index_of("Abandon"), None);
        assert_eq!(index_of("aband"), None);
    }
}
