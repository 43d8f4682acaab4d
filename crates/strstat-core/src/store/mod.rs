//! Storage abstraction for strstat.
//!
//! The [`Store`] trait is the storage collaborator the service layer is
//! constructed with. It persists [`StoredString`]s, enforces uniqueness on
//! `content_hash`, and evaluates a [`PredicateSet`] in whatever form its
//! backend needs.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::filter::PredicateSet;
use crate::models::StoredString;

/// Result of [`Store::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same `content_hash` already exists; it was left
    /// untouched.
    Duplicate(StoredString),
}

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](Store::insert) | Insert a record unless its hash already exists |
/// | [`get`](Store::get) | Fetch a record by content hash |
/// | [`list`](Store::list) | All records matching a predicate set, newest first |
/// | [`delete`](Store::delete) | Remove a record by content hash |
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert(&self, record: &StoredString) -> Result<InsertOutcome>;

    async fn get(&self, content_hash: &str) -> Result<Option<StoredString>>;

    /// Return every record satisfying all `predicates`, newest first.
    async fn list(&self, predicates: &PredicateSet) -> Result<Vec<StoredString>>;

    /// Returns `true` if a record was removed.
    async fn delete(&self, content_hash: &str) -> Result<bool>;
}
