//! Storage traits and error types

use crate::storage::ArticleRecord;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent store of harvested article records
///
/// URLs are exact-string keys; the store never normalizes them. Inserting
/// a URL that already exists is a silent no-op, which is what makes the
/// whole pipeline safe to re-run over previously seen frontiers.
pub trait ArticleStore {
    /// Returns the subset of `urls` already present in the store
    fn exists_by_url(&self, urls: &BTreeSet<String>) -> StorageResult<HashSet<String>>;

    /// Inserts records, skipping URLs that already exist
    ///
    /// Returns the number of records actually inserted. Concurrent inserts
    /// of the same URL resolve to exactly one stored record.
    fn insert_many(&mut self, records: &[ArticleRecord]) -> StorageResult<usize>;

    /// Fetches one record by its exact URL
    fn get_by_url(&self, url: &str) -> StorageResult<Option<ArticleRecord>>;

    /// Total number of stored records
    fn count_articles(&self) -> StorageResult<u64>;

    /// Number of stored records of one kind
    fn count_by_kind(&self, kind: crate::storage::RecordKind) -> StorageResult<u64>;

    /// Evicts oldest records until accounted bytes fit under `max_bytes`
    ///
    /// Returns the number of records evicted.
    fn enforce_quota(&mut self, max_bytes: u64) -> StorageResult<usize>;
}

/// External source of frontier URLs
///
/// Failures here are expected operating conditions, not fatal errors:
/// callers fall back to configured or builtin seeds and keep crawling.
pub trait FrontierSource {
    /// Seed URLs to start a cycle from
    fn fetch_seed_urls(&self) -> StorageResult<Vec<String>>;

    /// Backlog URLs carried over from previous sessions
    fn fetch_backlog_urls(&self) -> StorageResult<Vec<String>>;

    /// Persists discovered URLs for future sessions
    fn persist_backlog_urls(&mut self, urls: &[String]) -> StorageResult<()>;

    /// Drops backlog entries that have since been harvested or consumed
    fn remove_backlog_urls(&mut self, urls: &[String]) -> StorageResult<()>;
}

/// External source of the tag vocabulary
pub trait TagVocabulary {
    /// Returns the tag set, possibly empty when none has been loaded
    fn fetch_tags(&self) -> StorageResult<BTreeSet<String>>;
}
