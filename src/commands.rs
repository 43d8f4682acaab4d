//! CLI command implementations.
//!
//! Each `run_*` function opens the configured database, performs one
//! [`StringService`] operation, and prints the result as pretty JSON on
//! stdout. Service errors are returned to `main`, which prints them on
//! stderr and exits non-zero.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use strstat_core::models::FilterMap;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::service::StringService;
use crate::sqlite_store::SqliteStore;

async fn open_service(config: &Config) -> Result<(SqlitePool, StringService)> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let service = StringService::new(Arc::new(SqliteStore::new(pool.clone())));
    Ok((pool, service))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the property record for `value` without touching the database.
pub fn run_analyze(value: &str) -> Result<()> {
    print_json(&strstat_core::analyze(value))
}

pub async fn run_add(config: &Config, value: &str) -> Result<()> {
    let (pool, service) = open_service(config).await?;
    let result = service.create(value).await;
    pool.close().await;
    print_json(&result?)
}

pub async fn run_get(config: &Config, value: &str) -> Result<()> {
    let (pool, service) = open_service(config).await?;
    let result = service.get(value).await;
    pool.close().await;
    print_json(&result?)
}

pub async fn run_list(config: &Config, filters: Vec<(String, String)>) -> Result<()> {
    let filters: FilterMap = filters.into_iter().collect();
    let (pool, service) = open_service(config).await?;
    let result = service.list(&filters).await;
    pool.close().await;
    print_json(&result?)
}

pub async fn run_query(config: &Config, text: &str) -> Result<()> {
    let (pool, service) = open_service(config).await?;
    let result = service.list_natural(text).await;
    pool.close().await;
    print_json(&result?)
}

pub async fn run_delete(config: &Config, value: &str) -> Result<()> {
    let (pool, service) = open_service(config).await?;
    let result = service.delete(value).await;
    pool.close().await;
    result?;
    println!("Deleted.");
    Ok(())
}
