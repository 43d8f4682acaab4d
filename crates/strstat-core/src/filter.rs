//! Filter validation: raw [`FilterMap`] in, typed [`PredicateSet`] out.
//!
//! Every recognized key is parsed exactly once into a [`FilterValue`] here,
//! so stores and callers never re-validate raw text. Keys are handled in
//! the fixed order of [`FilterKey::ALL`] and the first invalid one fails
//! the whole build.
//!
//! | Key | Accepted value | Predicate |
//! |-----|----------------|-----------|
//! | `is_palindrome` | `true` / `false` (case-sensitive) | `is_palindrome == v` |
//! | `min_length` | base-10 integer | `length >= v` |
//! | `max_length` | base-10 integer | `length <= v` |
//! | `word_count` | base-10 integer | `word_count == v` |
//! | `contains_character` | exactly one character | `character_frequency_map[v] > 0` |
//!
//! Unrecognized keys are skipped. A map with no recognized keys yields an
//! empty set, which matches every record.
//!
//! Cross-field checks also live here: `min_length > max_length` is a
//! [`FilterError::Conflict`] whether the filters came from query
//! parameters or from [`nl::parse_query`](crate::nl::parse_query).

use serde::Serialize;
use tracing::debug;

use crate::error::FilterError;
use crate::models::{FilterKey, FilterMap, PropertyRecord};

/// A filter value after type coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Char(char),
}

/// The [`PropertyRecord`] field a predicate constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Length,
    IsPalindrome,
    WordCount,
    CharacterFrequencyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Eq,
    Gte,
    Lte,
    /// The value is a key of the map with a positive count.
    HasKey,
}

/// One typed constraint over a [`PropertyRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub field: Field,
    pub op: Op,
    pub value: FilterValue,
}

impl Predicate {
    /// Evaluate the predicate against a record in memory.
    ///
    /// A value whose type does not fit the field never matches.
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        match (self.field, self.value) {
            (Field::IsPalindrome, FilterValue::Bool(b)) => {
                self.op == Op::Eq && record.is_palindrome == b
            }
            (Field::Length, FilterValue::Int(n)) => compare(self.op, record.length, n),
            (Field::WordCount, FilterValue::Int(n)) => compare(self.op, record.word_count, n),
            (Field::CharacterFrequencyMap, FilterValue::Char(c)) => {
                self.op == Op::HasKey
                    && record
                        .character_frequency_map
                        .get(&c)
                        .is_some_and(|count| *count > 0)
            }
            _ => false,
        }
    }
}

fn compare(op: Op, actual: u64, expected: i64) -> bool {
    let actual = i128::from(actual);
    let expected = i128::from(expected);
    match op {
        Op::Eq => actual == expected,
        Op::Gte => actual >= expected,
        Op::Lte => actual <= expected,
        Op::HasKey => false,
    }
}

/// Ordered conjunction of predicates. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }

    pub fn matches(&self, record: &PropertyRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}

impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Echo of the filters that were applied, holding parsed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,
}

/// Output of [`build_filters`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltFilters {
    pub predicates: PredicateSet,
    pub applied: AppliedFilters,
}

/// Validate `filters` and turn recognized keys into predicates.
pub fn build_filters(filters: &FilterMap) -> Result<BuiltFilters, FilterError> {
    let mut built = BuiltFilters::default();

    for key in FilterKey::ALL {
        let Some(raw) = filters.get(key.as_str()) else {
            continue;
        };

        let (field, op, value) = match key {
            FilterKey::IsPalindrome => {
                let b = parse_bool(key, raw)?;
                built.applied.is_palindrome = Some(b);
                (Field::IsPalindrome, Op::Eq, FilterValue::Bool(b))
            }
            FilterKey::MinLength => {
                let n = parse_int(key, raw)?;
                built.applied.min_length = Some(n);
                (Field::Length, Op::Gte, FilterValue::Int(n))
            }
            FilterKey::MaxLength => {
                let n = parse_int(key, raw)?;
                built.applied.max_length = Some(n);
                (Field::Length, Op::Lte, FilterValue::Int(n))
            }
            FilterKey::WordCount => {
                let n = parse_int(key, raw)?;
                built.applied.word_count = Some(n);
                (Field::WordCount, Op::Eq, FilterValue::Int(n))
            }
            FilterKey::ContainsCharacter => {
                let c = parse_char(key, raw)?;
                built.applied.contains_character = Some(c);
                (Field::CharacterFrequencyMap, Op::HasKey, FilterValue::Char(c))
            }
        };
        built
            .predicates
            .predicates
            .push(Predicate { field, op, value });
    }

    if let (Some(min), Some(max)) = (built.applied.min_length, built.applied.max_length) {
        if min > max {
            return Err(FilterError::Conflict {
                reason: format!("min_length ({}) is greater than max_length ({})", min, max),
            });
        }
    }

    for name in filters.keys() {
        if FilterKey::parse(name).is_none() {
            debug!(key = %name, "ignoring unrecognized filter");
        }
    }

    Ok(built)
}

fn parse_bool(key: FilterKey, raw: &str) -> Result<bool, FilterError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FilterError::invalid(
            key,
            format!("expected 'true' or 'false', got '{}'", raw),
        )),
    }
}

fn parse_int(key: FilterKey, raw: &str) -> Result<i64, FilterError> {
    raw.parse::<i64>()
        .map_err(|_| FilterError::invalid(key, format!("expected an integer, got '{}'", raw)))
}

fn parse_char(key: FilterKey, raw: &str) -> Result<char, FilterError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        (None, _) => Err(FilterError::invalid(key, "must not be empty")),
        (Some(_), Some(_)) => Err(FilterError::invalid(
            key,
            format!("expected a single character, got '{}'", raw),
        )),
    }
}
