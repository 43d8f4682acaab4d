//! Core data models shared by the analyzer, the filter builder, and stores.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyze::analyze;

/// Computed properties of a single string value.
///
/// Produced once by [`analyze`](crate::analyze::analyze) and never mutated
/// afterwards. A `BTreeMap` keeps the frequency map in a stable order so
/// two analyses of the same input serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub length: u64,
    pub is_palindrome: bool,
    pub unique_characters: u64,
    pub word_count: u64,
    pub content_hash: String,
    pub character_frequency_map: BTreeMap<char, u64>,
}

/// A persisted string together with its analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredString {
    /// Random row identifier, internal to the store.
    pub id: String,
    pub value: String,
    /// SHA-256 of `value`; the uniqueness key.
    pub content_hash: String,
    pub properties: PropertyRecord,
    pub created_at: DateTime<Utc>,
}

impl StoredString {
    /// Analyze `value` and stamp it with a fresh id and the current time.
    ///
    /// The timestamp is truncated to milliseconds, the precision stores keep.
    pub fn new(value: &str) -> Self {
        let properties = analyze(value);
        Self {
            id: Uuid::new_v4().to_string(),
            value: value.to_string(),
            content_hash: properties.content_hash.clone(),
            properties,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Raw filter parameters keyed by name.
///
/// Values are untyped text until [`build_filters`](crate::filter::build_filters)
/// validates them. Unrecognized keys may be present and are ignored.
pub type FilterMap = BTreeMap<String, String>;

/// The closed set of filter keys the builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    IsPalindrome,
    MinLength,
    MaxLength,
    WordCount,
    ContainsCharacter,
}

impl FilterKey {
    /// All keys in builder evaluation order.
    pub const ALL: [FilterKey; 5] = [
        FilterKey::IsPalindrome,
        FilterKey::MinLength,
        FilterKey::MaxLength,
        FilterKey::WordCount,
        FilterKey::ContainsCharacter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::IsPalindrome => "is_palindrome",
            FilterKey::MinLength => "min_length",
            FilterKey::MaxLength => "max_length",
            FilterKey::WordCount => "word_count",
            FilterKey::ContainsCharacter => "contains_character",
        }
    }

    pub fn parse(name: &str) -> Option<FilterKey> {
        FilterKey::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
