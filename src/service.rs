//! Request orchestration.
//!
//! [`StringService`] ties the pure core (analysis, filter building,
//! natural-language parsing) to a [`Store`] supplied by the caller. Both the
//! HTTP server and the CLI go through it, so they share one set of
//! validation rules and one error taxonomy ([`ServiceError`]).

use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use strstat_core::error::{FilterError, NlError};
use strstat_core::filter::{build_filters, AppliedFilters};
use strstat_core::models::{FilterMap, PropertyRecord, StoredString};
use strstat_core::nl::parse_query;
use strstat_core::store::{InsertOutcome, Store};
use strstat_core::content_hash;

/// Every way a service operation can fail.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input value or filter.
    #[error("{0}")]
    Validation(String),

    /// The value is already stored.
    #[error("string already exists in the system")]
    Conflict(Box<StringResponse>),

    #[error("string does not exist in the system")]
    NotFound,

    /// Natural-language text matched no rule.
    #[error("{0}")]
    Unparseable(String),

    /// Filters that contradict each other.
    #[error("{0}")]
    ConflictingFilters(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Invalid { .. } => ServiceError::Validation(err.to_string()),
            FilterError::Conflict { .. } => ServiceError::ConflictingFilters(err.to_string()),
        }
    }
}

impl From<NlError> for ServiceError {
    fn from(err: NlError) -> Self {
        match err {
            NlError::Unparseable { .. } => ServiceError::Unparseable(err.to_string()),
            NlError::Conflicting { .. } => ServiceError::ConflictingFilters(err.to_string()),
        }
    }
}

/// A stored string as returned to callers. `id` is the content hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringResponse {
    pub id: String,
    pub value: String,
    pub properties: PropertyRecord,
    /// RFC 3339, millisecond precision, UTC.
    pub created_at: String,
}

impl From<StoredString> for StringResponse {
    fn from(s: StoredString) -> Self {
        Self {
            id: s.content_hash,
            value: s.value,
            properties: s.properties,
            created_at: s.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub data: Vec<StringResponse>,
    pub count: usize,
    pub filters_applied: AppliedFilters,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterpretedQuery {
    pub original: String,
    pub parsed_filters: FilterMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct NaturalListResponse {
    pub data: Vec<StringResponse>,
    pub count: usize,
    pub filters_applied: AppliedFilters,
    pub interpreted_query: InterpretedQuery,
}

/// Application service over an injected [`Store`].
#[derive(Clone)]
pub struct StringService {
    store: Arc<dyn Store>,
}

impl StringService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Analyze-and-store from a JSON request body `{ "value": "..." }`.
    pub async fn create_from_json(
        &self,
        body: &serde_json::Value,
    ) -> Result<StringResponse, ServiceError> {
        match body.get("value") {
            Some(serde_json::Value::String(value)) => self.create(value).await,
            Some(_) => Err(ServiceError::Validation(
                "\"value\" must be a string".to_string(),
            )),
            None => Err(ServiceError::Validation(
                "missing required field \"value\"".to_string(),
            )),
        }
    }

    /// Analyze `value` and store it unless an identical value exists.
    pub async fn create(&self, value: &str) -> Result<StringResponse, ServiceError> {
        if value.trim().is_empty() {
            return Err(ServiceError::Validation(
                "\"value\" must be a non-empty string".to_string(),
            ));
        }

        let record = StoredString::new(value);
        match self.store.insert(&record).await? {
            InsertOutcome::Inserted => {
                info!(hash = %record.content_hash, length = record.properties.length, "stored string");
                Ok(record.into())
            }
            InsertOutcome::Duplicate(existing) => {
                debug!(hash = %existing.content_hash, "rejected duplicate string");
                Err(ServiceError::Conflict(Box::new(existing.into())))
            }
        }
    }

    /// Look up the record for an exact value.
    pub async fn get(&self, value: &str) -> Result<StringResponse, ServiceError> {
        self.store
            .get(&content_hash(value))
            .await?
            .map(StringResponse::from)
            .ok_or(ServiceError::NotFound)
    }

    /// List records matching structured filter parameters.
    pub async fn list(&self, filters: &FilterMap) -> Result<ListResponse, ServiceError> {
        let built = build_filters(filters)?;
        let data: Vec<StringResponse> = self
            .store
            .list(&built.predicates)
            .await?
            .into_iter()
            .map(StringResponse::from)
            .collect();

        debug!(predicates = built.predicates.len(), matched = data.len(), "listed strings");
        Ok(ListResponse {
            count: data.len(),
            data,
            filters_applied: built.applied,
        })
    }

    /// Interpret `query` as natural language, then list as [`list`](Self::list) does.
    pub async fn list_natural(&self, query: &str) -> Result<NaturalListResponse, ServiceError> {
        let parsed = parse_query(query)?;
        let listed = self.list(&parsed).await?;

        Ok(NaturalListResponse {
            data: listed.data,
            count: listed.count,
            filters_applied: listed.filters_applied,
            interpreted_query: InterpretedQuery {
                original: query.to_string(),
                parsed_filters: parsed,
            },
        })
    }

    /// Remove the record for an exact value.
    pub async fn delete(&self, value: &str) -> Result<(), ServiceError> {
        let hash = content_hash(value);
        if self.store.delete(&hash).await? {
            info!(hash = %hash, "deleted string");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}
