//! # strstat core
//!
//! Pure logic for strstat: deterministic string analysis, filter
//! validation, natural-language query parsing, and the storage
//! abstraction the service layer executes predicates against.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or other
//! native-only dependencies. Analysis, filter building and query parsing
//! are side-effect free and safe to call concurrently.
//!
//! ## Data Flow
//!
//! ```text
//! value ──▶ analyze ──▶ PropertyRecord ──▶ Store::insert
//!
//! "palindromic single word" ──▶ nl::parse_query ─┐
//!                                                ▼
//!             ?min_length=5 ──────────────▶ FilterMap ──▶ filter::build_filters
//!                                                              │
//!                                                              ▼
//!                                          PredicateSet ──▶ Store::list
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `PropertyRecord`, `StoredString`, `FilterMap`, `FilterKey` |
//! | [`analyze`] | Property computation and SHA-256 content hashing |
//! | [`filter`] | Raw filter validation into a typed `PredicateSet` |
//! | [`nl`] | Rule-table natural-language query parser |
//! | [`store`] | `Store` trait and in-memory implementation |
//! | [`error`] | Filter and query-parse error types |

pub mod analyze;
pub mod error;
pub mod filter;
pub mod models;
pub mod nl;
pub mod store;

pub use analyze::{analyze, content_hash};
pub use error::{FilterError, NlError};
pub use filter::{build_filters, AppliedFilters, BuiltFilters, PredicateSet};
pub use models::{FilterKey, FilterMap, PropertyRecord, StoredString};
pub use nl::parse_query;
