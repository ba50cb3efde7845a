//! Frontier management and the continuous crawl loop
//!
//! A cycle assembles a frontier (seeds, external backlog, links discovered
//! last cycle), scrapes it in batches, persists article-shaped results, and
//! carries newly discovered links into the next cycle. A session runs
//! cycles until a wall-clock budget is spent; the continuous loop restarts
//! sessions forever. Persistence and frontier-source failures are logged
//! and survived, never fatal.

use crate::classify::{is_article_like, record_kind_for};
use crate::config::{defaults::default_seed_urls, Config};
use crate::crawler::batch::BatchOrchestrator;
use crate::crawler::scraper::{ScrapeResult, ScrapeStatus};
use crate::storage::{ArticleRecord, ArticleStore, FrontierSource};
use crate::url::is_fetchable_url;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters for one completed cycle
#[derive(Debug, Default, Clone)]
pub struct CycleStats {
    pub frontier_size: usize,
    pub scraped: usize,
    pub ok: usize,
    pub robots_denied: usize,
    pub fetch_errors: usize,
    pub empty_responses: usize,
    pub parse_errors: usize,
    pub persisted: usize,
    pub evicted: usize,
    pub discovered_links: usize,
}

impl CycleStats {
    fn tally(&mut self, status: ScrapeStatus) {
        self.scraped += 1;
        match status {
            ScrapeStatus::Ok => self.ok += 1,
            ScrapeStatus::RobotsDenied => self.robots_denied += 1,
            ScrapeStatus::FetchError => self.fetch_errors += 1,
            ScrapeStatus::EmptyResponse => self.empty_responses += 1,
            ScrapeStatus::ParseError => self.parse_errors += 1,
        }
    }
}

/// Owns the frontier and drives crawl cycles
pub struct FrontierManager<S, F>
where
    S: ArticleStore,
    F: FrontierSource,
{
    config: Arc<Config>,
    orchestrator: BatchOrchestrator,
    store: S,
    frontier_source: F,
    /// Links discovered last cycle, consumed by the next one
    backlog: BTreeSet<String>,
}

impl<S, F> FrontierManager<S, F>
where
    S: ArticleStore,
    F: FrontierSource,
{
    pub fn new(config: Arc<Config>, orchestrator: BatchOrchestrator, store: S, frontier_source: F) -> Self {
        Self {
            config,
            orchestrator,
            store,
            frontier_source,
            backlog: BTreeSet::new(),
        }
    }

    /// Number of URLs queued for the next cycle
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Access to the underlying store (stats reporting)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds the deduplicated frontier for one cycle
    ///
    /// Seeds come from the frontier source when it has any, else from the
    /// config, else from the builtin list. External backlog and the links
    /// carried over from last cycle are merged in; everything passes the
    /// crawlable-URL gate.
    fn assemble_frontier(&mut self) -> BTreeSet<String> {
        let mut frontier = BTreeSet::new();

        let seeds = match self.frontier_source.fetch_seed_urls() {
            Ok(seeds) if !seeds.is_empty() => seeds,
            Ok(_) => self.fallback_seeds(),
            Err(e) => {
                warn!(error = %e, "seed source unavailable, using fallback seeds");
                self.fallback_seeds()
            }
        };
        frontier.extend(seeds.into_iter().filter(|u| is_fetchable_url(u)));

        match self.frontier_source.fetch_backlog_urls() {
            Ok(urls) => frontier.extend(urls.into_iter().filter(|u| is_fetchable_url(u))),
            Err(e) => warn!(error = %e, "backlog source unavailable, continuing without it"),
        }

        frontier.extend(std::mem::take(&mut self.backlog));
        frontier
    }

    fn fallback_seeds(&self) -> Vec<String> {
        if !self.config.frontier.seeds.is_empty() {
            self.config.frontier.seeds.clone()
        } else {
            default_seed_urls()
        }
    }

    /// Runs one full cycle over the current frontier
    pub async fn run_cycle(&mut self) -> CycleStats {
        let frontier = self.assemble_frontier();
        let mut stats = CycleStats {
            frontier_size: frontier.len(),
            ..CycleStats::default()
        };
        let mut discovered: BTreeSet<String> = BTreeSet::new();

        let batches = BatchOrchestrator::partition(&frontier, self.orchestrator.batch_size());
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            let results = self.orchestrator.run_batch(batch).await;
            self.persist_results(&results, &mut stats);

            for result in &results {
                if let Some(content) = &result.content {
                    discovered.extend(content.outbound_links.iter().cloned());
                }
            }

            if i + 1 < batch_count {
                self.orchestrator.pause_between_batches().await;
            }
        }

        // Consumed frontier URLs are done; discovered links are next cycle's work
        let consumed: Vec<String> = frontier.iter().cloned().collect();
        if let Err(e) = self.frontier_source.remove_backlog_urls(&consumed) {
            warn!(error = %e, "could not prune consumed backlog entries");
        }
        let fresh: Vec<String> = discovered
            .iter()
            .filter(|u| !frontier.contains(*u))
            .cloned()
            .collect();
        if let Err(e) = self.frontier_source.persist_backlog_urls(&fresh) {
            warn!(error = %e, "could not persist discovered links, carrying in memory only");
        }
        self.backlog = fresh.into_iter().collect();
        stats.discovered_links = self.backlog.len();

        let max_bytes = self.config.storage.max_store_bytes;
        if max_bytes > 0 {
            match self.store.enforce_quota(max_bytes) {
                Ok(evicted) => stats.evicted = evicted,
                Err(e) => warn!(error = %e, "quota enforcement failed"),
            }
        }

        info!(
            frontier = stats.frontier_size,
            ok = stats.ok,
            persisted = stats.persisted,
            robots_denied = stats.robots_denied,
            fetch_errors = stats.fetch_errors,
            empty = stats.empty_responses,
            parse_errors = stats.parse_errors,
            discovered = stats.discovered_links,
            evicted = stats.evicted,
            "cycle complete"
        );

        stats
    }

    /// Persists the article-shaped successes from one batch
    ///
    /// A result is persisted when it scraped Ok, carries content, and its
    /// URL classifies as article-like. Existing URLs are skipped; the
    /// `INSERT OR IGNORE` underneath makes the skip race-proof. Storage
    /// failures lose this batch's records but not the cycle.
    fn persist_results(&mut self, results: &[ScrapeResult], stats: &mut CycleStats) {
        for result in results {
            stats.tally(result.status);
        }

        let candidates: Vec<&ScrapeResult> = results
            .iter()
            .filter(|r| r.status == ScrapeStatus::Ok && r.content.is_some())
            .filter(|r| is_article_like(&r.url))
            .collect();

        if candidates.is_empty() {
            return;
        }

        let urls: BTreeSet<String> = candidates.iter().map(|r| r.url.clone()).collect();
        let existing = match self.store.exists_by_url(&urls) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "existence check failed, skipping batch persistence");
                return;
            }
        };

        let records: Vec<ArticleRecord> = candidates
            .iter()
            .filter(|r| !existing.contains(&r.url))
            .filter_map(|r| {
                r.content.as_ref().map(|content| ArticleRecord {
                    url: r.url.clone(),
                    kind: record_kind_for(&r.url),
                    content: content.clone(),
                })
            })
            .collect();

        if records.is_empty() {
            return;
        }

        match self.store.insert_many(&records) {
            Ok(inserted) => stats.persisted += inserted,
            Err(e) => warn!(error = %e, "insert failed, dropping this batch's records"),
        }
    }

    /// Runs cycles until the session's wall-clock budget is spent
    ///
    /// The budget is checked between cycles, so a session always finishes
    /// the cycle it is in.
    pub async fn run_session(&mut self) -> CycleStats {
        let budget = Duration::from_secs(self.config.crawler.session_budget_seconds);
        let started = Instant::now();
        let mut totals = CycleStats::default();
        let mut cycles = 0u64;

        while started.elapsed() < budget {
            let stats = self.run_cycle().await;
            cycles += 1;
            totals.frontier_size += stats.frontier_size;
            totals.scraped += stats.scraped;
            totals.ok += stats.ok;
            totals.robots_denied += stats.robots_denied;
            totals.fetch_errors += stats.fetch_errors;
            totals.empty_responses += stats.empty_responses;
            totals.parse_errors += stats.parse_errors;
            totals.persisted += stats.persisted;
            totals.evicted += stats.evicted;
            totals.discovered_links = stats.discovered_links;
        }

        info!(
            cycles,
            elapsed_s = started.elapsed().as_secs(),
            persisted = totals.persisted,
            "session budget spent"
        );
        totals
    }

    /// Runs a fixed number of cycles (operator tooling)
    pub async fn run_cycles(&mut self, count: u64) -> CycleStats {
        let mut totals = CycleStats::default();
        for _ in 0..count {
            let stats = self.run_cycle().await;
            totals.scraped += stats.scraped;
            totals.ok += stats.ok;
            totals.persisted += stats.persisted;
            totals.discovered_links = stats.discovered_links;
        }
        totals
    }

    /// Runs sessions back to back, forever
    pub async fn run_forever(&mut self) -> ! {
        loop {
            self.run_session().await;
            info!("starting next session");
        }
    }
}
