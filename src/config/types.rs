use serde::Deserialize;

/// Main configuration structure for Gleaner
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub frontier: FrontierConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Wall-clock budget for a single fetch (seconds)
    #[serde(rename = "fetch-timeout-seconds")]
    pub fetch_timeout_seconds: u64,

    /// Maximum number of response bytes accumulated per fetch
    #[serde(rename = "max-fetch-bytes")]
    pub max_fetch_bytes: usize,

    /// Number of URLs processed concurrently per batch
    #[serde(rename = "batch-size")]
    pub batch_size: usize,

    /// Worker pool size; 0 means "available cores minus one, at least one"
    #[serde(rename = "worker-count", default)]
    pub worker_count: usize,

    /// Pause between batches (milliseconds), throttles outbound request rate
    #[serde(rename = "batch-pause-ms", default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    /// Wall-clock budget per crawl session (seconds) before the frontier
    /// sources are re-read
    #[serde(rename = "session-budget-seconds")]
    pub session_budget_seconds: u64,

    /// Whether to consult robots.txt before fetching
    #[serde(rename = "obey-robots-txt", default = "default_true")]
    pub obey_robots_txt: bool,
}

fn default_batch_pause_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user agent string: `Name/Version (+url; email)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Storage quota in bytes; 0 disables quota eviction
    #[serde(rename = "max-store-bytes", default)]
    pub max_store_bytes: u64,
}

/// Frontier configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FrontierConfig {
    /// Seed URLs crawled at the start of every cycle; when empty, the
    /// builtin seed list is used
    #[serde(default)]
    pub seeds: Vec<String>,
}
