//! Batch orchestration
//!
//! Splits a deduplicated frontier into fixed-size batches and scrapes each
//! batch on a bounded pool of concurrent tasks. Concurrency is capped by a
//! semaphore; a task that panics loses its URL for this cycle but never
//! takes the batch down with it.

use crate::config::CrawlerConfig;
use crate::crawler::scraper::{PageScraper, ScrapeResult};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, trace};

/// Resolves the effective worker count
///
/// A configured value of zero means "derive from the machine": available
/// parallelism minus one, floored at one, so the harvester leaves a core
/// for everything else running on the host.
pub fn resolve_worker_count(configured: usize) -> usize {
    if configured > 0 {
        return configured;
    }
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// Runs scrapes in bounded concurrent batches
pub struct BatchOrchestrator {
    scraper: Arc<PageScraper>,
    batch_size: usize,
    workers: usize,
    batch_pause: Duration,
}

impl BatchOrchestrator {
    pub fn new(scraper: Arc<PageScraper>, config: &CrawlerConfig) -> Self {
        Self {
            scraper,
            batch_size: config.batch_size,
            workers: resolve_worker_count(config.worker_count),
            batch_pause: Duration::from_millis(config.batch_pause_ms),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Splits a deduplicated URL set into consecutive batches
    ///
    /// Iteration order of the input set is preserved, so partitioning is
    /// deterministic for a given frontier.
    pub fn partition(urls: &BTreeSet<String>, batch_size: usize) -> Vec<Vec<String>> {
        let mut batches = Vec::new();
        let mut current = Vec::with_capacity(batch_size.min(urls.len()));

        for url in urls {
            current.push(url.clone());
            if current.len() == batch_size {
                batches.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }

    /// Scrapes one batch with bounded concurrency
    ///
    /// Results arrive in completion order, not submission order. A panicked
    /// worker is logged and its URL simply produces no result.
    pub async fn run_batch(&self, batch: Vec<String>) -> Vec<ScrapeResult> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut join_set = JoinSet::new();

        for url in batch {
            let scraper = Arc::clone(&self.scraper);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                // The semaphore is never closed; a failed acquire only
                // means shutdown, in which case scraping unguarded is moot.
                let _permit = semaphore.acquire_owned().await.ok();
                trace!(url = %url, "scraping");
                scraper.scrape(&url).await
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!(error = %e, "scrape worker failed, skipping its URL"),
            }
        }
        results
    }

    /// Sleeps the configured pause between consecutive batches
    pub async fn pause_between_batches(&self) {
        if !self.batch_pause.is_zero() {
            tokio::time::sleep(self.batch_pause).await;
        }
    }
}
