//! Gleaner: a polite, bounded article harvester
//!
//! This crate implements a continuously running web crawler that discovers
//! article and discussion pages from a frontier of seed sites, scrapes them
//! under strict time and size bounds, and persists de-duplicated records.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Gleaner operations
#[derive(Debug, Error)]
pub enum GleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Gleaner operations
pub type Result<T> = std::result::Result<T, GleanerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::is_article_like;
pub use config::Config;
pub use crawler::{ArticleContent, ScrapeResult, ScrapeStatus};
pub use storage::{ArticleRecord, RecordKind};
