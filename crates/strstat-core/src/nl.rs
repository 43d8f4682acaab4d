//! Natural-language filter parsing.
//!
//! [`parse_query`] turns free text such as `"single word palindromic
//! strings"` into the same [`FilterMap`] that query parameters produce.
//! It is a closed table of trigger/effect rules, not a language model:
//! every rule in [`RULES`] runs against the lower-cased text, in table
//! order, and writes its keys into the map. A later rule overwrites an
//! earlier rule's value for the same key.
//!
//! | Rule | Trigger | Effect |
//! |------|---------|--------|
//! | `single_word` | "single word", "one word" | `word_count = 1` |
//! | `palindrome` | "palindrome", "palindromic" | `is_palindrome = true` |
//! | | "not palindromic", "not a palindrome", "non-palindromic" | `is_palindrome = false` |
//! | `longer_than` | "longer than N characters", "greater than N characters" | `min_length = N + 1` |
//! | `shorter_than` | "shorter than N characters", "less than N characters" | `max_length = N - 1` |
//! | `first_vowel` | "first vowel" | `is_palindrome = true`, `contains_character = a` |
//! | `containing_letter` | "containing the letter x" | `contains_character = x` |
//!
//! `first_vowel` is a fixed substitution: it always means the letter `a`.
//!
//! Text that asserts both a positive and a negated palindrome form is
//! rejected with [`NlError::Conflicting`]. Text no rule recognizes is
//! rejected with [`NlError::Unparseable`]. Range conflicts such as
//! "longer than 10 and shorter than 5 characters" are left to
//! [`build_filters`](crate::filter::build_filters), which applies the same
//! check to every filter source.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::NlError;
use crate::models::{FilterKey, FilterMap};

/// A named trigger/effect rule.
///
/// `apply` returns `Ok(true)` when the rule fired and wrote into the map.
pub struct Rule {
    pub name: &'static str,
    apply: fn(&str, &mut FilterMap) -> Result<bool, NlError>,
}

/// Rules in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "single_word",
        apply: single_word,
    },
    Rule {
        name: "palindrome",
        apply: palindrome,
    },
    Rule {
        name: "longer_than",
        apply: longer_than,
    },
    Rule {
        name: "shorter_than",
        apply: shorter_than,
    },
    Rule {
        name: "first_vowel",
        apply: first_vowel,
    },
    Rule {
        name: "containing_letter",
        apply: containing_letter,
    },
];

/// Parse `text` into raw filters.
///
/// # Example
///
/// ```rust
/// use strstat_core::nl::parse_query;
///
/// let filters = parse_query("strings longer than 10 characters").unwrap();
/// assert_eq!(filters["min_length"], "11");
/// ```
pub fn parse_query(text: &str) -> Result<FilterMap, NlError> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(NlError::Unparseable {
            reason: "query is empty".to_string(),
        });
    }

    let mut filters = FilterMap::new();
    let mut matched = false;
    for rule in RULES {
        if (rule.apply)(&normalized, &mut filters)? {
            debug!(rule = rule.name, "natural-language rule matched");
            matched = true;
        }
    }

    if !matched {
        return Err(NlError::Unparseable {
            reason: format!("no recognized pattern in '{}'", text.trim()),
        });
    }

    Ok(filters)
}

fn set(filters: &mut FilterMap, key: FilterKey, value: impl ToString) {
    filters.insert(key.as_str().to_string(), value.to_string());
}

fn single_word(text: &str, filters: &mut FilterMap) -> Result<bool, NlError> {
    if text.contains("single word") || text.contains("one word") {
        set(filters, FilterKey::WordCount, 1);
        return Ok(true);
    }
    Ok(false)
}

fn palindrome_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\b(not\s+(?:a\s+)?|non[\s-]?))?palindrom(?:e|ic)")
            .expect("palindrome pattern is valid")
    })
}

fn palindrome(text: &str, filters: &mut FilterMap) -> Result<bool, NlError> {
    let mut positive = false;
    let mut negated = false;
    for caps in palindrome_regex().captures_iter(text) {
        if caps.get(1).is_some() {
            negated = true;
        } else {
            positive = true;
        }
    }

    match (positive, negated) {
        (true, true) => Err(NlError::Conflicting {
            reason: "query asks for both palindromic and non-palindromic strings".to_string(),
        }),
        (true, false) => {
            set(filters, FilterKey::IsPalindrome, true);
            Ok(true)
        }
        (false, true) => {
            set(filters, FilterKey::IsPalindrome, false);
            Ok(true)
        }
        (false, false) => Ok(false),
    }
}

fn length_bound(text: &str, re: &Regex) -> Result<Option<i64>, NlError> {
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };
    let digits = &caps[1];
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|_| NlError::Unparseable {
            reason: format!("length bound '{}' is out of range", digits),
        })
}

fn longer_than(text: &str, filters: &mut FilterMap) -> Result<bool, NlError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:longer|greater)\s+than\s+([0-9]+)\s+characters?")
            .expect("longer-than pattern is valid")
    });

    let Some(n) = length_bound(text, re)? else {
        return Ok(false);
    };
    let min = n.checked_add(1).ok_or_else(|| NlError::Unparseable {
        reason: format!("length bound '{}' is out of range", n),
    })?;
    set(filters, FilterKey::MinLength, min);
    Ok(true)
}

fn shorter_than(text: &str, filters: &mut FilterMap) -> Result<bool, NlError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:shorter|less)\s+than\s+([0-9]+)\s+characters?")
            .expect("shorter-than pattern is valid")
    });

    let Some(n) = length_bound(text, re)? else {
        return Ok(false);
    };
    // n is non-negative, so this cannot underflow.
    set(filters, FilterKey::MaxLength, n - 1);
    Ok(true)
}

fn first_vowel(text: &str, filters: &mut FilterMap) -> Result<bool, NlError> {
    if text.contains("first vowel") {
        set(filters, FilterKey::IsPalindrome, true);
        set(filters, FilterKey::ContainsCharacter, 'a');
        return Ok(true);
    }
    Ok(false)
}

fn containing_letter(text: &str, filters: &mut FilterMap) -> Result<bool, NlError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"containing\s+the\s+letter\s+([a-z])").expect("letter pattern is valid")
    });

    let Some(caps) = re.captures(text) else {
        return Ok(false);
    };
    set(filters, FilterKey::ContainsCharacter, &caps[1]);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::build_filters;

    fn map(pairs: &[(&str, &str)]) -> FilterMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_single_word_palindromic() {
        let f = parse_query("all single word palindromic strings").unwrap();
        assert_eq!(f, map(&[("word_count", "1"), ("is_palindrome", "true")]));
    }

    #[test]
    fn test_longer_than_is_exclusive() {
        let f = parse_query("strings longer than 10 characters").unwrap();
        assert_eq!(f, map(&[("min_length", "11")]));

        let f = parse_query("Strings GREATER THAN 0 character").unwrap();
        assert_eq!(f, map(&[("min_length", "1")]));
    }

    #[test]
    fn test_shorter_than_is_exclusive() {
        let f = parse_query("strings shorter than 5 characters").unwrap();
        assert_eq!(f, map(&[("max_length", "4")]));

        let f = parse_query("less than 0 characters").unwrap();
        assert_eq!(f, map(&[("max_length", "-1")]));
    }

    #[test]
    fn test_first_vowel_heuristic() {
        let f = parse_query("palindromic strings that contain the first vowel").unwrap();
        assert_eq!(
            f,
            map(&[("is_palindrome", "true"), ("contains_character", "a")])
        );
    }

    #[test]
    fn test_containing_letter_is_case_folded() {
        let f = parse_query("strings containing the letter Z").unwrap();
        assert_eq!(f, map(&[("contains_character", "z")]));
    }

    #[test]
    fn test_containing_letter_overrides_first_vowel() {
        let f = parse_query("first vowel strings containing the letter q").unwrap();
        assert_eq!(f["contains_character"], "q");
        assert_eq!(f["is_palindrome"], "true");
    }

    #[test]
    fn test_unrecognized_text_is_unparseable() {
        assert!(matches!(
            parse_query("xyz"),
            Err(NlError::Unparseable { .. })
        ));
        assert!(matches!(parse_query("   "), Err(NlError::Unparseable { .. })));
        assert!(matches!(parse_query(""), Err(NlError::Unparseable { .. })));
    }

    #[test]
    fn test_positive_and_negated_palindrome_conflict() {
        assert!(matches!(
            parse_query("palindromic strings that are not palindromic"),
            Err(NlError::Conflicting { .. })
        ));
        assert!(matches!(
            parse_query("a palindrome that is non-palindromic"),
            Err(NlError::Conflicting { .. })
        ));
    }

    #[test]
    fn test_negated_palindrome_alone() {
        let f = parse_query("single word strings that are not palindromic").unwrap();
        assert_eq!(f, map(&[("word_count", "1"), ("is_palindrome", "false")]));

        let f = parse_query("strings that are not a palindrome").unwrap();
        assert_eq!(f["is_palindrome"], "false");
    }

    #[test]
    fn test_words_containing_not_are_not_negations() {
        let f = parse_query("another palindrome").unwrap();
        assert_eq!(f["is_palindrome"], "true");
    }

    #[test]
    fn test_non_ascii_digits_are_not_bounds() {
        let f = parse_query("palindromic strings longer than ٣ characters").unwrap();
        assert_eq!(f, map(&[("is_palindrome", "true")]));

        let f = parse_query("single word strings shorter than ５ characters").unwrap();
        assert_eq!(f, map(&[("word_count", "1")]));

        assert!(matches!(
            parse_query("longer than ٣ characters"),
            Err(NlError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_overflowing_bound_is_unparseable() {
        assert!(matches!(
            parse_query("longer than 99999999999999999999999 characters"),
            Err(NlError::Unparseable { .. })
        ));
        assert!(matches!(
            parse_query("longer than 9223372036854775807 characters"),
            Err(NlError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_parsed_filters_feed_the_builder() {
        let f = parse_query("single word palindromic strings longer than 3 characters").unwrap();
        let built = build_filters(&f).unwrap();
        assert_eq!(built.predicates.len(), 3);
        assert_eq!(built.applied.min_length, Some(4));
        assert_eq!(built.applied.word_count, Some(1));
    }

    #[test]
    fn test_inverted_range_from_text_conflicts_in_builder() {
        let f = parse_query("strings longer than 10 characters and shorter than 5 characters")
            .unwrap();
        assert!(build_filters(&f).is_err());
    }

    #[test]
    fn test_idempotent() {
        let q = "single word strings containing the letter e";
        assert_eq!(parse_query(q).unwrap(), parse_query(q).unwrap());
    }

    #[test]
    fn test_rule_table_order() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "single_word",
                "palindrome",
                "longer_than",
                "shorter_than",
                "first_vowel",
                "containing_letter"
            ]
        );
    }
}
