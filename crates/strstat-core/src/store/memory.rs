//! In-memory [`Store`] implementation for tests and single-process use.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`, in insertion order.
//! Listing evaluates each predicate with [`Predicate::matches`](crate::filter::Predicate::matches).

use std::sync::{PoisonError, RwLock};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::filter::PredicateSet;
use crate::models::StoredString;

use super::{InsertOutcome, Store};

/// In-memory store for tests and single-process use.
pub struct InMemoryStore {
    records: RwLock<Vec<StoredString>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read().map_err(poisoned)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert(&self, record: &StoredString) -> Result<InsertOutcome> {
        let mut records = self.records.write().map_err(poisoned)?;
        if let Some(existing) = records
            .iter()
            .find(|r| r.content_hash == record.content_hash)
        {
            return Ok(InsertOutcome::Duplicate(existing.clone()));
        }
        records.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn get(&self, content_hash: &str) -> Result<Option<StoredString>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .find(|r| r.content_hash == content_hash)
            .cloned())
    }

    async fn list(&self, predicates: &PredicateSet) -> Result<Vec<StoredString>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .rev()
            .filter(|r| predicates.matches(&r.properties))
            .cloned()
            .collect())
    }

    async fn delete(&self, content_hash: &str) -> Result<bool> {
        let mut records = self.records.write().map_err(poisoned)?;
        let before = records.len();
        records.retain(|r| r.content_hash != content_hash);
        Ok(records.len() < before)
    }
}
