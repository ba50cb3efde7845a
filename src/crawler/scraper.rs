//! Page scraping pipeline
//!
//! [`PageScraper::scrape`] turns one URL into one [`ScrapeResult`], always.
//! Robots denial, timeouts, empty bodies, and unparseable responses are all
//! expressed as result statuses rather than errors, so a batch of scrapes
//! can be collected and tallied without any control flow for failures.

use crate::crawler::extract::{
    extract_description, extract_image, extract_outbound_links, extract_publish_date,
    extract_tags, extract_title,
};
use crate::crawler::fetcher::{decode_body, FetchFailure, Fetcher};
use crate::crawler::robots::RobotsChecker;
use chrono::Utc;
use scraper::Html;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Terminal status of a single scrape attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    /// Content was extracted
    Ok,
    /// robots.txt disallows fetching this URL
    RobotsDenied,
    /// The fetch failed (timeout, connection error, protocol error)
    FetchError,
    /// The fetch succeeded but the body was empty
    EmptyResponse,
    /// The body contained no recognizable markup
    ParseError,
}

impl ScrapeStatus {
    /// Stable label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStatus::Ok => "ok",
            ScrapeStatus::RobotsDenied => "robots-denied",
            ScrapeStatus::FetchError => "fetch-error",
            ScrapeStatus::EmptyResponse => "empty-response",
            ScrapeStatus::ParseError => "parse-error",
        }
    }
}

/// Extracted fields for a successfully scraped page
///
/// Every field degrades to empty rather than failing: a page with no title
/// still yields a record with an empty title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub tags: BTreeSet<String>,
    pub publish_date: Option<String>,
    pub outbound_links: Vec<String>,
}

/// The outcome of scraping one URL
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub url: String,
    pub status: ScrapeStatus,
    /// Human-readable detail for non-Ok statuses
    pub error: Option<String>,
    /// Present exactly when `status` is `Ok`
    pub content: Option<ArticleContent>,
    /// HTTP status of the response, when one was received
    pub http_status: Option<u16>,
    /// Whether the byte cap truncated the body
    pub truncated: bool,
    /// Milliseconds since the Unix epoch at which the attempt started
    pub timestamp_ms: i64,
}

impl ScrapeResult {
    fn failure(url: &str, status: ScrapeStatus, error: String, timestamp_ms: i64) -> Self {
        Self {
            url: url.to_string(),
            status,
            error: Some(error),
            content: None,
            http_status: None,
            truncated: false,
            timestamp_ms,
        }
    }
}

/// Scrapes pages into structured article content
pub struct PageScraper {
    fetcher: Arc<Fetcher>,
    robots: RobotsChecker,
    vocabulary: BTreeSet<String>,
    obey_robots: bool,
}

impl PageScraper {
    /// Creates a scraper
    ///
    /// `vocabulary` is the tag set matched against page titles; pass the
    /// builtin default when no external vocabulary is available.
    pub fn new(
        fetcher: Arc<Fetcher>,
        robots: RobotsChecker,
        vocabulary: BTreeSet<String>,
        obey_robots: bool,
    ) -> Self {
        Self {
            fetcher,
            robots,
            vocabulary,
            obey_robots,
        }
    }

    /// Scrapes one URL end to end
    ///
    /// Order of checks: robots policy, fetch, empty-body check, markup
    /// check, extraction. The first failed check decides the status; a
    /// truncated body is not a failure and flows through extraction with
    /// the `truncated` flag set.
    pub async fn scrape(&self, url: &str) -> ScrapeResult {
        let timestamp_ms = Utc::now().timestamp_millis();

        if self.obey_robots && !self.robots.is_allowed(url).await {
            debug!(url, "scrape denied by robots.txt");
            return ScrapeResult::failure(
                url,
                ScrapeStatus::RobotsDenied,
                "disallowed by robots.txt".to_string(),
                timestamp_ms,
            );
        }

        let outcome = match self.fetcher.fetch(url).await {
            Ok(o) => o,
            Err(failure) => {
                let detail = match &failure {
                    FetchFailure::Timeout { .. } => "request timed out".to_string(),
                    FetchFailure::Network { detail, .. } => detail.clone(),
                };
                debug!(url, error = %failure, "scrape fetch failed");
                return ScrapeResult::failure(url, ScrapeStatus::FetchError, detail, timestamp_ms);
            }
        };

        if outcome.body.is_empty() {
            return ScrapeResult {
                url: url.to_string(),
                status: ScrapeStatus::EmptyResponse,
                error: Some("response body was empty".to_string()),
                content: None,
                http_status: Some(outcome.status),
                truncated: false,
                timestamp_ms,
            };
        }

        let text = decode_body(&outcome.body);
        if !text.contains('<') {
            return ScrapeResult {
                url: url.to_string(),
                status: ScrapeStatus::ParseError,
                error: Some("no markup found in response body".to_string()),
                content: None,
                http_status: Some(outcome.status),
                truncated: outcome.truncated,
                timestamp_ms,
            };
        }

        let base = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                return ScrapeResult::failure(
                    url,
                    ScrapeStatus::ParseError,
                    format!("invalid page URL: {}", e),
                    timestamp_ms,
                );
            }
        };

        let doc = Html::parse_document(&text);
        let title = extract_title(&doc);
        let content = ArticleContent {
            description: extract_description(&doc),
            image_url: extract_image(&doc, &base),
            tags: extract_tags(&title, &self.vocabulary),
            publish_date: extract_publish_date(&doc),
            outbound_links: extract_outbound_links(&doc, &base),
            title,
        };

        ScrapeResult {
            url: url.to_string(),
            status: ScrapeStatus::Ok,
            error: None,
            content: Some(content),
            http_status: Some(outcome.status),
            truncated: outcome.truncated,
            timestamp_ms,
        }
    }
}
