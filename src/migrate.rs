//! Database schema migrations (idempotent).
//!
//! Scalar properties get their own columns so filters run as indexed SQL
//! comparisons. The character frequency map is stored twice: verbatim in
//! `properties_json`, and exploded into `string_chars` for
//! `contains_character` lookups.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the schema to an already open pool.
pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS strings (
            id TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            content_hash TEXT NOT NULL UNIQUE,
            length INTEGER NOT NULL,
            is_palindrome INTEGER NOT NULL,
            unique_characters INTEGER NOT NULL,
            word_count INTEGER NOT NULL,
            properties_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS string_chars (
            string_id TEXT NOT NULL,
            ch TEXT NOT NULL,
            count INTEGER NOT NULL,
            PRIMARY KEY (string_id, ch),
            FOREIGN KEY (string_id) REFERENCES strings(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_length ON strings(length)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_word_count ON strings(word_count)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_is_palindrome ON strings(is_palindrome)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_strings_created_at ON strings(created_at DESC)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_string_chars_ch ON string_chars(ch)")
        .execute(pool)
        .await?;

    Ok(())
}
