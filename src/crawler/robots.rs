//! robots.txt compliance
//!
//! Per-host robots.txt policies are fetched once and cached for 24 hours.
//! The checker fails open: an unreachable, erroring, or undecodable
//! robots.txt never blocks a crawl, on the grounds that a transient
//! infrastructure problem on the target's side should not silently wedge
//! the harvester. Sites that want us gone express it in a fetchable
//! robots.txt, and that is honored exactly.

use crate::crawler::fetcher::{decode_body, Fetcher};
use crate::url::robots_url_for;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// How long a cached robots.txt stays valid
const CACHE_TTL_HOURS: i64 = 24;

/// A cached per-host robots.txt fetch
///
/// `content` is `None` when the fetch failed or returned a non-success
/// status; that entry still occupies the cache so a dead host is not
/// re-probed on every URL.
struct CachedRobots {
    content: Option<String>,
    fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > ChronoDuration::hours(CACHE_TTL_HOURS)
    }
}

/// Checks URLs against per-host robots.txt policies
pub struct RobotsChecker {
    fetcher: Arc<Fetcher>,
    bot_name: String,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsChecker {
    /// Creates a checker that identifies as `bot_name` when matching rules
    pub fn new(fetcher: Arc<Fetcher>, bot_name: String) -> Self {
        Self {
            fetcher,
            bot_name,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Decides whether `url` may be fetched
    ///
    /// Returns `true` (allowed) whenever a definitive "disallowed" answer
    /// cannot be derived: unparseable URL, unreachable robots.txt, or a
    /// non-success response.
    pub async fn is_allowed(&self, url: &str) -> bool {
        let robots_url = match robots_url_for(url) {
            Some(r) => r,
            None => return true,
        };

        let cached = {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache
                .get(&robots_url)
                .filter(|entry| !entry.is_stale())
                .map(|entry| entry.content.clone())
        };

        let content = match cached {
            Some(c) => c,
            None => {
                let fetched = self.fetch_robots(&robots_url).await;
                let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                cache.insert(
                    robots_url.clone(),
                    CachedRobots {
                        content: fetched.clone(),
                        fetched_at: Utc::now(),
                    },
                );
                fetched
            }
        };

        match content {
            None => true,
            Some(text) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(&text, &self.bot_name, url)
            }
        }
    }

    /// Fetches and decodes a robots.txt, returning `None` on any failure
    async fn fetch_robots(&self, robots_url: &str) -> Option<String> {
        match self.fetcher.fetch(robots_url).await {
            Err(e) => {
                debug!(robots_url, error = %e, "robots.txt unreachable, failing open");
                None
            }
            Ok(outcome) => {
                if !(200..300).contains(&outcome.status) {
                    debug!(
                        robots_url,
                        status = outcome.status,
                        "robots.txt returned non-success status, failing open"
                    );
                    return None;
                }
                Some(decode_body(&outcome.body))
            }
        }
    }

    /// Number of hosts currently cached (test hook)
    #[cfg(test)]
    pub fn cached_hosts(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
