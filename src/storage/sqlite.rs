//! SQLite storage backend
//!
//! Implements all three storage traits on a single database file. Tag sets
//! and link lists are stored as JSON text columns; the URL column's UNIQUE
//! constraint plus `INSERT OR IGNORE` gives at-most-once semantics for a
//! URL even under concurrent writers on separate connections.

use crate::crawler::ArticleContent;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    ArticleStore, FrontierSource, StorageError, StorageResult, TagVocabulary,
};
use crate::storage::{ArticleRecord, RecordKind};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// How many URLs go into one `IN (...)` clause
const QUERY_CHUNK: usize = 500;

/// How many rows one eviction pass deletes
const EVICTION_CHUNK: usize = 50;

/// SQLite-backed store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so a reader (stats) and a writer (crawl) can coexist
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of URLs waiting in the backlog table
    pub fn backlog_count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM backlog", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Sum of accounted record bytes
    pub fn stored_bytes(&self) -> StorageResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(byte_size), 0) FROM articles",
            [],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(raw: &str) -> StorageResult<T> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Raw row shape before JSON columns are decoded
struct ArticleRow {
    url: String,
    kind: String,
    title: String,
    description: String,
    image_url: String,
    tags: String,
    publish_date: Option<String>,
    outbound_links: String,
}

fn row_to_record(row: ArticleRow) -> StorageResult<ArticleRecord> {
    let kind = RecordKind::from_db_string(&row.kind).ok_or_else(|| {
        StorageError::Serialization(format!("unknown record kind '{}'", row.kind))
    })?;
    let tags: BTreeSet<String> = decode_json(&row.tags)?;
    let outbound_links: Vec<String> = decode_json(&row.outbound_links)?;

    Ok(ArticleRecord {
        url: row.url,
        kind,
        content: ArticleContent {
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            tags,
            publish_date: row.publish_date,
            outbound_links,
        },
    })
}

impl ArticleStore for SqliteStore {
    fn exists_by_url(&self, urls: &BTreeSet<String>) -> StorageResult<HashSet<String>> {
        let mut found = HashSet::new();
        let all: Vec<&String> = urls.iter().collect();

        for chunk in all.chunks(QUERY_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT url FROM articles WHERE url IN ({})",
                placeholders
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(
                rusqlite::params_from_iter(chunk.iter().map(|s| s.as_str())),
                |row| row.get::<_, String>(0),
            )?;
            for url in rows {
                found.insert(url?);
            }
        }

        Ok(found)
    }

    fn insert_many(&mut self, records: &[ArticleRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        let mut inserted = 0;

        for record in records {
            let tags = encode_json(&record.content.tags)?;
            let links = encode_json(&record.content.outbound_links)?;

            let changed = tx.execute(
                "INSERT OR IGNORE INTO articles
                 (url, kind, title, description, image_url, tags, publish_date,
                  outbound_links, byte_size, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.url,
                    record.kind.to_db_string(),
                    record.content.title,
                    record.content.description,
                    record.content.image_url,
                    tags,
                    record.content.publish_date,
                    links,
                    record.byte_size() as i64,
                    now,
                ],
            )?;
            inserted += changed;
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn get_by_url(&self, url: &str) -> StorageResult<Option<ArticleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, kind, title, description, image_url, tags, publish_date, outbound_links
             FROM articles WHERE url = ?1",
        )?;

        let row = stmt
            .query_row(params![url], |row| {
                Ok(ArticleRow {
                    url: row.get(0)?,
                    kind: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    image_url: row.get(4)?,
                    tags: row.get(5)?,
                    publish_date: row.get(6)?,
                    outbound_links: row.get(7)?,
                })
            })
            .optional()?;

        match row {
            Some(r) => Ok(Some(row_to_record(r)?)),
            None => Ok(None),
        }
    }

    fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_kind(&self, kind: RecordKind) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE kind = ?1",
            params![kind.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn enforce_quota(&mut self, max_bytes: u64) -> StorageResult<usize> {
        let mut evicted = 0;

        loop {
            if self.stored_bytes()? <= max_bytes {
                break;
            }
            // Oldest first; id breaks ties within the same timestamp
            let deleted = self.conn.execute(
                "DELETE FROM articles WHERE id IN (
                     SELECT id FROM articles
                     ORDER BY inserted_at ASC, id ASC
                     LIMIT ?1
                 )",
                params![EVICTION_CHUNK as i64],
            )?;
            if deleted == 0 {
                break;
            }
            evicted += deleted;
        }

        Ok(evicted)
    }
}

impl FrontierSource for SqliteStore {
    fn fetch_seed_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM seeds ORDER BY url")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn fetch_backlog_urls(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM backlog ORDER BY url")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn persist_backlog_urls(&mut self, urls: &[String]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for url in urls {
            tx.execute(
                "INSERT OR IGNORE INTO backlog (url, added_at) VALUES (?1, ?2)",
                params![url, now],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_backlog_urls(&mut self, urls: &[String]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        for url in urls {
            tx.execute("DELETE FROM backlog WHERE url = ?1", params![url])?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl TagVocabulary for SqliteStore {
    fn fetch_tags(&self) -> StorageResult<BTreeSet<String>> {
        let mut stmt = self.conn.prepare("SELECT tag FROM vocabulary")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<BTreeSet<_>, _>>().map_err(Into::into)
    }
}
