//! SQLite-backed [`Store`] implementation.
//!
//! Each [`Predicate`] becomes one `WHERE` clause against the `strings`
//! table (see [`migrate`](crate::migrate) for the schema):
//!
//! | Predicate | SQL |
//! |-----------|-----|
//! | `is_palindrome == b` | `s.is_palindrome = ?` |
//! | `length >= n` / `length <= n` | `s.length >= ?` / `s.length <= ?` |
//! | `word_count == n` | `s.word_count = ?` |
//! | `character_frequency_map has c` | `EXISTS (SELECT 1 FROM string_chars ...)` |

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use strstat_core::filter::{Field, FilterValue, Op, Predicate, PredicateSet};
use strstat_core::models::{PropertyRecord, StoredString};
use strstat_core::store::{InsertOutcome, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
enum Bind {
    Int(i64),
    Bool(bool),
    Text(String),
}

/// Translate one predicate into a SQL condition and its bind value.
///
/// Combinations the builder never produces translate to a condition that
/// matches nothing, mirroring [`Predicate::matches`].
fn predicate_sql(p: &Predicate) -> (&'static str, Option<Bind>) {
    match (p.field, p.op, p.value) {
        (Field::IsPalindrome, Op::Eq, FilterValue::Bool(b)) => {
            ("s.is_palindrome = ?", Some(Bind::Bool(b)))
        }
        (Field::Length, Op::Eq, FilterValue::Int(n)) => ("s.length = ?", Some(Bind::Int(n))),
        (Field::Length, Op::Gte, FilterValue::Int(n)) => ("s.length >= ?", Some(Bind::Int(n))),
        (Field::Length, Op::Lte, FilterValue::Int(n)) => ("s.length <= ?", Some(Bind::Int(n))),
        (Field::WordCount, Op::Eq, FilterValue::Int(n)) => {
            ("s.word_count = ?", Some(Bind::Int(n)))
        }
        (Field::WordCount, Op::Gte, FilterValue::Int(n)) => {
            ("s.word_count >= ?", Some(Bind::Int(n)))
        }
        (Field::WordCount, Op::Lte, FilterValue::Int(n)) => {
            ("s.word_count <= ?", Some(Bind::Int(n)))
        }
        (Field::CharacterFrequencyMap, Op::HasKey, FilterValue::Char(c)) => (
            "EXISTS (SELECT 1 FROM string_chars c \
             WHERE c.string_id = s.id AND c.ch = ? AND c.count > 0)",
            Some(Bind::Text(c.to_string())),
        ),
        _ => ("0", None),
    }
}

/// Build the full `SELECT` for a predicate set.
fn list_sql(predicates: &PredicateSet) -> (String, Vec<Bind>) {
    let mut sql = String::from(
        "SELECT s.id, s.value, s.content_hash, s.properties_json, s.created_at FROM strings s",
    );
    let mut binds = Vec::new();

    for (i, p) in predicates.iter().enumerate() {
        let (cond, bind) = predicate_sql(p);
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(cond);
        binds.extend(bind);
    }

    sql.push_str(" ORDER BY s.created_at DESC, s.rowid DESC");
    (sql, binds)
}

fn row_to_stored(row: &SqliteRow) -> Result<StoredString> {
    let properties_json: String = row.get("properties_json");
    let properties: PropertyRecord = serde_json::from_str(&properties_json)
        .with_context(|| "stored properties_json is not a valid property record")?;
    let created_ms: i64 = row.get("created_at");
    let created_at = DateTime::from_timestamp_millis(created_ms)
        .ok_or_else(|| anyhow!("stored created_at out of range: {}", created_ms))?;

    Ok(StoredString {
        id: row.get("id"),
        value: row.get("value"),
        content_hash: row.get("content_hash"),
        properties,
        created_at,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, record: &StoredString) -> Result<InsertOutcome> {
        let props = &record.properties;
        let properties_json = serde_json::to_string(props)?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO strings (id, value, content_hash, length, is_palindrome,
                                 unique_characters, word_count, properties_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(content_hash) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.value)
        .bind(&record.content_hash)
        .bind(i64::try_from(props.length)?)
        .bind(props.is_palindrome)
        .bind(i64::try_from(props.unique_characters)?)
        .bind(i64::try_from(props.word_count)?)
        .bind(&properties_json)
        .bind(record.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            let existing = self
                .get(&record.content_hash)
                .await?
                .ok_or_else(|| anyhow!("duplicate hash {} vanished", record.content_hash))?;
            return Ok(InsertOutcome::Duplicate(existing));
        }

        for (ch, count) in &props.character_frequency_map {
            sqlx::query("INSERT INTO string_chars (string_id, ch, count) VALUES (?, ?, ?)")
                .bind(&record.id)
                .bind(ch.to_string())
                .bind(i64::try_from(*count)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(InsertOutcome::Inserted)
    }

    async fn get(&self, content_hash: &str) -> Result<Option<StoredString>> {
        let row = sqlx::query(
            "SELECT s.id, s.value, s.content_hash, s.properties_json, s.created_at \
             FROM strings s WHERE s.content_hash = ?",
        )
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_stored).transpose()
    }

    async fn list(&self, predicates: &PredicateSet) -> Result<Vec<StoredString>> {
        let (sql, binds) = list_sql(predicates);

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = match bind {
                Bind::Int(n) => query.bind(n),
                Bind::Bool(b) => query.bind(b),
                Bind::Text(s) => query.bind(s),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_stored).collect()
    }

    async fn delete(&self, content_hash: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM string_chars WHERE string_id IN \
             (SELECT id FROM strings WHERE content_hash = ?)",
        )
        .bind(content_hash)
        .execute(&mut *tx)
        .await?;

        let removed = sqlx::query("DELETE FROM strings WHERE content_hash = ?")
            .bind(content_hash)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(removed > 0)
    }
}
