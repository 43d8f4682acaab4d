//! Deterministic string property analysis.
//!
//! [`analyze`] derives a fixed [`PropertyRecord`] from any input string.
//! It never fails, including for the empty string, and depends on nothing
//! but its argument.
//!
//! # Counting
//!
//! Lengths and character counts are measured in Unicode scalar values
//! (`char`), so the frequency map always sums to `length`.
//!
//! # Palindromes
//!
//! The text is lower-cased, then every character that is not an ASCII
//! letter or digit is dropped; the remainder must equal its reversal and
//! be non-empty. Non-ASCII letters are removed, not folded.
//!
//! # Example
//!
//! ```rust
//! use strstat_core::analyze::analyze;
//!
//! let record = analyze("hello");
//! assert_eq!(record.length, 5);
//! assert_eq!(record.unique_characters, 4);
//! assert_eq!(record.character_frequency_map[&'l'], 2);
//! ```

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::models::PropertyRecord;

/// Compute every property of `text`.
pub fn analyze(text: &str) -> PropertyRecord {
    let character_frequency_map = character_frequencies(text);
    let length = character_frequency_map.values().sum();

    PropertyRecord {
        length,
        is_palindrome: is_palindrome(text),
        unique_characters: character_frequency_map.len() as u64,
        word_count: word_count(text),
        content_hash: content_hash(text),
        character_frequency_map,
    }
}

/// SHA-256 of the raw UTF-8 bytes, as 64 lowercase hex characters.
///
/// This is the uniqueness key for stored strings, so lookups by value hash
/// the value with this same function.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_palindrome(text: &str) -> bool {
    let normalized: Vec<char> = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    !normalized.is_empty() && normalized.iter().eq(normalized.iter().rev())
}

/// Words are separated by runs of Unicode whitespace, the same set
/// `str::trim` strips, so a value that trims to empty has zero words.
fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

fn character_frequencies(text: &str) -> BTreeMap<char, u64> {
    let mut freq = BTreeMap::new();
    for c in text.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }
    freq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        let r = analyze("");
        assert_eq!(r.length, 0);
        assert_eq!(r.word_count, 0);
        assert_eq!(r.unique_characters, 0);
        assert!(!r.is_palindrome);
        assert!(r.character_frequency_map.is_empty());
        assert_eq!(
            r.content_hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hello() {
        let r = analyze("hello");
        assert_eq!(r.length, 5);
        assert_eq!(r.unique_characters, 4);
        assert_eq!(r.word_count, 1);
        assert!(!r.is_palindrome);
        let expected: BTreeMap<char, u64> =
            [('h', 1), ('e', 1), ('l', 2), ('o', 1)].into_iter().collect();
        assert_eq!(r.character_frequency_map, expected);
        assert_eq!(
            r.content_hash,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sentence_palindrome_ignores_case_and_spaces() {
        let r = analyze("A man a plan a canal Panama");
        assert!(r.is_palindrome);
        assert_eq!(r.word_count, 7);
    }

    #[test]
    fn test_punctuation_only_is_not_palindrome() {
        assert!(!analyze("!!!").is_palindrome);
        assert!(!analyze("   ").is_palindrome);
    }

    #[test]
    fn test_single_char_is_palindrome() {
        assert!(analyze("x").is_palindrome);
        assert!(analyze("7").is_palindrome);
    }

    #[test]
    fn test_non_ascii_letters_are_dropped_not_folded() {
        // "é" is stripped, leaving "ab" vs "ab" reversed => not a palindrome.
        assert!(!analyze("aéb").is_palindrome);
        // Only the ASCII letters survive: "aa".
        assert!(analyze("aéa").is_palindrome);
        assert!(analyze("ÅbbÄ").is_palindrome);
    }

    #[test]
    fn test_unique_characters_are_case_sensitive() {
        let r = analyze("Aa a!");
        // 'A', 'a', ' ', '!'
        assert_eq!(r.unique_characters, 4);
        assert_eq!(r.character_frequency_map[&'a'], 2);
        assert_eq!(r.character_frequency_map[&' '], 1);
    }

    #[test]
    fn test_word_count_collapses_whitespace_runs() {
        assert_eq!(analyze("  one \t two\n\nthree  ").word_count, 3);
        assert_eq!(analyze(" \t\n ").word_count, 0);
        assert_eq!(analyze("one").word_count, 1);
    }

    #[test]
    fn test_word_count_agrees_with_trim() {
        for blank in ["\u{0B}", "\u{A0}", " \u{0C}\u{2003} "] {
            assert!(blank.trim().is_empty());
            assert_eq!(analyze(blank).word_count, 0, "input {:?}", blank);
        }
        assert_eq!(analyze("a\u{0B}b").word_count, 2);
        assert_eq!(analyze("a\u{A0}b c").word_count, 3);
    }

    #[test]
    fn test_frequencies_sum_to_length() {
        for text in ["", "hello world", "ünïcödé ✓✓", "a\tb\nc", "🦀🦀 rust"] {
            let r = analyze(text);
            let sum: u64 = r.character_frequency_map.values().sum();
            assert_eq!(sum, r.length, "mismatch for {:?}", text);
            assert_eq!(r.length, text.chars().count() as u64);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = analyze("Was it a car or a cat I saw?");
        let b = analyze("Was it a car or a cat I saw?");
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert!(a.is_palindrome);
    }

    #[test]
    fn test_hash_is_distinct_per_value() {
        assert_ne!(content_hash("abc"), content_hash("abc "));
        assert_eq!(content_hash("abc").len(), 64);
    }
}
