//! Gleaner main entry point

use clap::Parser;
use gleaner::config::load_config_with_hash;
use gleaner::crawler::harvest;
use gleaner::storage::{ArticleStore, SqliteStore};
use gleaner::RecordKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Gleaner: a polite, bounded article harvester
///
/// Gleaner continuously crawls a frontier of seed sites, scraping pages
/// under strict time and size bounds while respecting robots.txt, and
/// persists de-duplicated article and discussion records.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version = "0.1.0")]
#[command(about = "A polite, bounded article harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Run this many cycles and exit; 0 or absent runs continuously
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        // --cycles 0 is the same as omitting it: run continuously
        handle_harvest(config, cli.cycles.filter(|n| *n > 0)).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &gleaner::config::Config) -> anyhow::Result<()> {
    println!("=== Gleaner Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Fetch timeout: {}s",
        config.crawler.fetch_timeout_seconds
    );
    println!("  Max fetch bytes: {}", config.crawler.max_fetch_bytes);
    println!("  Batch size: {}", config.crawler.batch_size);
    println!(
        "  Workers: {} (effective: {})",
        config.crawler.worker_count,
        gleaner::crawler::resolve_worker_count(config.crawler.worker_count)
    );
    println!(
        "  Session budget: {}s",
        config.crawler.session_budget_seconds
    );
    println!("  Obey robots.txt: {}", config.crawler.obey_robots_txt);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    if config.storage.max_store_bytes > 0 {
        println!("  Store quota: {} bytes", config.storage.max_store_bytes);
    } else {
        println!("  Store quota: unlimited");
    }

    if config.frontier.seeds.is_empty() {
        println!(
            "\nSeeds: none configured, builtin list of {} sites applies",
            gleaner::config::defaults::DEFAULT_SEED_SITES.len()
        );
    } else {
        println!("\nSeeds ({}):", config.frontier.seeds.len());
        for seed in &config.frontier.seeds {
            println!("  - {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &gleaner::config::Config) -> anyhow::Result<()> {
    use std::path::Path;

    println!("Database: {}\n", config.storage.database_path);

    let store = SqliteStore::new(Path::new(&config.storage.database_path))?;

    println!("Records: {}", store.count_articles()?);
    println!("  Articles: {}", store.count_by_kind(RecordKind::Article)?);
    println!(
        "  Discussions: {}",
        store.count_by_kind(RecordKind::Discussion)?
    );
    println!("Stored bytes: {}", store.stored_bytes()?);
    println!("Backlog: {}", store.backlog_count()?);

    Ok(())
}

/// Handles the harvest operation, continuous or fixed-cycle
async fn handle_harvest(
    config: gleaner::config::Config,
    cycles: Option<u64>,
) -> anyhow::Result<()> {
    match cycles {
        Some(n) => tracing::info!("Running {} cycle(s)", n),
        None => tracing::info!(
            "Running continuously in {}s sessions",
            config.crawler.session_budget_seconds
        ),
    }

    match harvest(config, cycles).await {
        Ok(()) => {
            tracing::info!("Harvest finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
