//! Error types for filter validation and natural-language parsing.
//!
//! Both are plain values returned through `Result`; nothing in the core
//! panics on well-typed input.

use thiserror::Error;

use crate::models::FilterKey;

/// Rejection from [`build_filters`](crate::filter::build_filters).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A recognized key carried a value of the wrong shape.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: FilterKey, reason: String },

    /// Individually valid filters that can never match together.
    #[error("conflicting filters: {reason}")]
    Conflict { reason: String },
}

impl FilterError {
    pub(crate) fn invalid(key: FilterKey, reason: impl Into<String>) -> Self {
        FilterError::Invalid {
            key,
            reason: reason.into(),
        }
    }

    /// The offending key, when the error concerns a single filter.
    pub fn key(&self) -> Option<FilterKey> {
        match self {
            FilterError::Invalid { key, .. } => Some(*key),
            FilterError::Conflict { .. } => None,
        }
    }
}

/// Rejection from [`parse_query`](crate::nl::parse_query).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NlError {
    #[error("unable to interpret query: {reason}")]
    Unparseable { reason: String },

    #[error("conflicting filters: {reason}")]
    Conflicting { reason: String },
}
