//! Configuration module for Gleaner
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus the builtin seed list and tag vocabulary used as fallbacks when external
//! frontier/vocabulary sources are unavailable.
//!
//! # Example
//!
//! ```no_run
//! use gleaner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.crawler.fetch_timeout_seconds);
//! ```

pub mod defaults;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FrontierConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
