//! Crawling pipeline
//!
//! The pipeline is layered bottom-up: the [`Fetcher`] performs bounded HTTP
//! reads, the [`RobotsChecker`] gates them by per-host policy, the
//! [`PageScraper`] turns one URL into one [`ScrapeResult`], the
//! [`BatchOrchestrator`] runs scrapes concurrently in batches, and the
//! [`FrontierManager`] drives cycles and sessions over the whole frontier.

mod batch;
mod extract;
mod fetcher;
mod frontier;
mod robots;
mod scraper;

pub use batch::{resolve_worker_count, BatchOrchestrator};
pub use fetcher::{decode_body, FetchFailure, FetchLimits, FetchOutcome, Fetcher};
pub use frontier::{CycleStats, FrontierManager};
pub use robots::RobotsChecker;
pub use scraper::{ArticleContent, PageScraper, ScrapeResult, ScrapeStatus};

use crate::config::{defaults::default_tag_vocabulary, Config};
use crate::storage::{SqliteStore, TagVocabulary};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Wires the full pipeline from a config and runs it
///
/// With `cycles = Some(n)` runs exactly `n` cycles and returns; with `None`
/// runs budgeted sessions forever. The store and the frontier source are
/// separate connections to the same database file so the crawl loop's
/// trait seams stay honest.
pub async fn harvest(config: Config, cycles: Option<u64>) -> crate::Result<()> {
    let config = Arc::new(config);

    let limits = FetchLimits {
        timeout: Duration::from_secs(config.crawler.fetch_timeout_seconds),
        max_bytes: config.crawler.max_fetch_bytes,
    };
    let fetcher = Arc::new(Fetcher::new(&config.user_agent, limits)?);
    let robots = RobotsChecker::new(
        Arc::clone(&fetcher),
        config.user_agent.crawler_name.clone(),
    );

    let db_path = Path::new(&config.storage.database_path);
    let store = SqliteStore::new(db_path)?;
    let frontier_source = SqliteStore::new(db_path)?;

    let vocabulary = match store.fetch_tags() {
        Ok(tags) if !tags.is_empty() => tags,
        _ => default_tag_vocabulary(),
    };

    let scraper = Arc::new(PageScraper::new(
        fetcher,
        robots,
        vocabulary,
        config.crawler.obey_robots_txt,
    ));
    let orchestrator = BatchOrchestrator::new(scraper, &config.crawler);
    info!(
        workers = orchestrator.workers(),
        batch_size = orchestrator.batch_size(),
        "pipeline ready"
    );

    let mut manager = FrontierManager::new(config, orchestrator, store, frontier_source);
    match cycles {
        Some(n) => {
            let stats = manager.run_cycles(n).await;
            info!(
                cycles = n,
                scraped = stats.scraped,
                persisted = stats.persisted,
                "finished requested cycles"
            );
            Ok(())
        }
        None => manager.run_forever().await,
    }
}
