//! # strstat
//!
//! **A string analysis and lookup service.**
//!
//! strstat stores one record per distinct string, computes a fixed set of
//! structural properties for it (length, palindrome, unique characters,
//! word count, SHA-256, character frequencies), and lets callers query the
//! collection by those properties, either with structured filters or with
//! a short natural-language phrase.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────────┐   ┌──────────┐
//! │   CLI    │──▶│          │──▶│ strstat-core  │   │          │
//! │(strstat) │   │ Service  │   │ analyze/filter│   │  SQLite  │
//! ├──────────┤   │          │   │ /nl (pure)    │   │          │
//! │   HTTP   │──▶│          │──────────────────────▶│          │
//! └──────────┘   └──────────┘        Store          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! strstat init
//! strstat add "A man a plan a canal Panama"
//! strstat list --filter is_palindrome=true
//! strstat query "single word palindromic strings"
//! strstat serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the core `Store` trait |
//! | [`service`] | Request orchestration and error taxonomy |
//! | [`server`] | HTTP server (Axum) with CORS |
//! | [`commands`] | CLI command implementations |

pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod service;
pub mod sqlite_store;

pub use strstat_core::store;
pub use strstat_core::{analyze, build_filters, parse_query, PropertyRecord, StoredString};
