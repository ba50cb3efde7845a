//! Storage module for harvested records
//!
//! Persistence is defined by small traits so the crawl loop never depends
//! on SQLite directly: [`ArticleStore`] holds harvested records,
//! [`FrontierSource`] supplies seeds and carries the backlog between
//! sessions, and [`TagVocabulary`] supplies the tag set. The bundled
//! backend implements all three on one SQLite file.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{
    ArticleStore, FrontierSource, StorageError, StorageResult, TagVocabulary,
};

use crate::crawler::ArticleContent;

/// Whether a record is a standalone article or a discussion/Q&A page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Article,
    Discussion,
}

impl RecordKind {
    /// Converts to the string stored in the database
    pub fn to_db_string(&self) -> &'static str {
        match self {
            RecordKind::Article => "article",
            RecordKind::Discussion => "discussion",
        }
    }

    /// Parses from a database string
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "article" => Some(RecordKind::Article),
            "discussion" => Some(RecordKind::Discussion),
            _ => None,
        }
    }
}

/// One harvested page, keyed by its exact URL string
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub url: String,
    pub kind: RecordKind,
    pub content: ArticleContent,
}

impl ArticleRecord {
    /// Approximate stored size in bytes, used for quota accounting
    pub fn byte_size(&self) -> u64 {
        let c = &self.content;
        let tags: usize = c.tags.iter().map(|t| t.len() + 4).sum();
        let links: usize = c.outbound_links.iter().map(|l| l.len() + 4).sum();
        (self.url.len()
            + c.title.len()
            + c.description.len()
            + c.image_url.len()
            + c.publish_date.as_ref().map(|d| d.len()).unwrap_or(0)
            + tags
            + links) as u64
    }
}
