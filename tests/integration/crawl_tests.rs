//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for remote sites and exercise the
//! scrape pipeline and the cycle loop end-to-end, including robots.txt
//! handling, timeouts, truncation, and persistence de-duplication.

use gleaner::config::{Config, CrawlerConfig, FrontierConfig, StorageConfig, UserAgentConfig};
use gleaner::crawler::{
    BatchOrchestrator, FetchLimits, Fetcher, FrontierManager, PageScraper, RobotsChecker,
    ScrapeStatus,
};
use gleaner::storage::{ArticleStore, SqliteStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_vocabulary() -> BTreeSet<String> {
    ["rust", "machine-learning", "testing"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestHarvester".to_string(),
        crawler_version: "0.1.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn build_scraper(obey_robots: bool) -> PageScraper {
    let limits = FetchLimits {
        timeout: Duration::from_secs(1),
        max_bytes: 4096,
    };
    let fetcher = Arc::new(Fetcher::new(&test_user_agent(), limits).expect("client builds"));
    let robots = RobotsChecker::new(Arc::clone(&fetcher), "TestHarvester".to_string());
    PageScraper::new(fetcher, robots, test_vocabulary(), obey_robots)
}

fn create_test_config(seeds: Vec<String>, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            fetch_timeout_seconds: 1,
            max_fetch_bytes: 65536,
            batch_size: 10,
            worker_count: 2,
            batch_pause_ms: 0,
            session_budget_seconds: 600,
            obey_robots_txt: true,
        },
        user_agent: test_user_agent(),
        storage: StorageConfig {
            database_path: db_path.to_string(),
            max_store_bytes: 0,
        },
        frontier: FrontierConfig { seeds },
    }
}

async fn mount_allow_all_robots(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_extracts_full_content() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    let body = format!(
        r#"<html><head>
        <title>Machine Learning in Rust</title>
        <meta name="description" content="Training models without leaving the borrow checker.">
        <meta property="og:image" content="/hero.png">
        <meta property="article:published_time" content="2024-03-14T09:00:00Z">
        </head><body>
        <a href="{0}/blog/2024/01/older-post-here">older</a>
        <a href="{0}/assets/logo.png">logo</a>
        <a href="mailto:author@example.com">mail</a>
        </body></html>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/blog/2024/03/ml-in-rust"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let url = format!("{}/blog/2024/03/ml-in-rust", server.uri());
    let result = scraper.scrape(&url).await;

    assert_eq!(result.status, ScrapeStatus::Ok);
    assert_eq!(result.http_status, Some(200));
    assert!(!result.truncated);

    let content = result.content.expect("ok result carries content");
    assert_eq!(content.title, "Machine Learning in Rust");
    assert_eq!(
        content.description,
        "Training models without leaving the borrow checker."
    );
    assert_eq!(content.image_url, format!("{}/hero.png", server.uri()));
    assert_eq!(content.publish_date.as_deref(), Some("2024-03-14"));
    // "Machine Learning" matches the hyphenated vocabulary tag, "Rust" the plain one
    assert!(content.tags.contains("machine-learning"));
    assert!(content.tags.contains("rust"));
    // Only the crawlable page link survives; asset and mailto links are dropped
    assert_eq!(
        content.outbound_links,
        vec![format!("{}/blog/2024/01/older-post-here", server.uri())]
    );
}

#[tokio::test]
async fn test_scrape_missing_metadata_degrades_to_empty() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/blog/2024/03/bare-post"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>words</p></body></html>"),
        )
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/bare-post", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::Ok);
    let content = result.content.unwrap();
    assert_eq!(content.title, "");
    assert_eq!(content.description, "");
    assert_eq!(content.image_url, "");
    assert_eq!(content.publish_date, None);
    assert!(content.outbound_links.is_empty());
    // Nothing in the vocabulary matched, so the catch-all tag applies
    assert_eq!(content.tags, BTreeSet::from(["general".to_string()]));
}

#[tokio::test]
async fn test_robots_disallow_blocks_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/"),
        )
        .mount(&server)
        .await;
    // The page itself must never be requested
    Mock::given(method("GET"))
        .and(path("/private/secret-article-draft"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/private/secret-article-draft", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::RobotsDenied);
    assert!(result.content.is_none());
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let server = MockServer::start().await;
    // No robots.txt mock: the server answers 404 and the scrape proceeds

    Mock::given(method("GET"))
        .and(path("/blog/2024/03/open-post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Open</title></head></html>"),
        )
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/open-post", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::Ok);
}

#[tokio::test]
async fn test_robots_disabled_skips_check_entirely() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"),
        )
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/2024/03/a-post"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let scraper = build_scraper(false);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/a-post", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::Ok);
}

#[tokio::test]
async fn test_slow_response_is_fetch_error() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/blog/2024/03/slow-post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/slow-post", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::FetchError);
    assert!(result.content.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_oversized_body_is_truncated_not_failed() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    // Well past the 4096-byte cap, markup up front so the prefix still parses
    let mut body = String::from("<html><head><title>Big</title></head><body>");
    body.push_str(&"x".repeat(20_000));
    body.push_str("</body></html>");
    Mock::given(method("GET"))
        .and(path("/blog/2024/03/huge-post"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/huge-post", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::Ok);
    assert!(result.truncated);
    assert_eq!(result.content.unwrap().title, "Big");
}

#[tokio::test]
async fn test_empty_body_is_empty_response() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/blog/2024/03/empty-post"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/empty-post", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::EmptyResponse);
    assert!(result.content.is_none());
}

#[tokio::test]
async fn test_markupless_body_is_parse_error() {
    let server = MockServer::start().await;
    mount_allow_all_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/blog/2024/03/plaintext"))
        .respond_with(ResponseTemplate::new(200).set_body_string("just some plain text, no tags"))
        .mount(&server)
        .await;

    let scraper = build_scraper(true);
    let result = scraper
        .scrape(&format!("{}/blog/2024/03/plaintext", server.uri()))
        .await;

    assert_eq!(result.status, ScrapeStatus::ParseError);
}

#[tokio::test]
async fn test_unreachable_host_is_fetch_error() {
    // Port from a server that has already shut down. A builder-made server
    // is exclusive (not pooled), so dropping it really closes the listener.
    let server = MockServer::builder().start().await;
    let url = format!("{}/blog/2024/03/gone-post", server.uri());
    drop(server);

    let scraper = build_scraper(false);
    let result = scraper.scrape(&url).await;

    assert_eq!(result.status, ScrapeStatus::FetchError);
}

#[tokio::test]
async fn test_cycle_persists_articles_and_follows_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    // robots.txt is absent; crawling proceeds fail-open

    // Seed page: not article-shaped itself, links to two articles
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<html><body>
            <a href="{0}/blog/2024/03/first-post">one</a>
            <a href="{0}/blog/2024/03/second-post">two</a>
            </body></html>"#,
            base
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/2024/03/first-post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>First</title></head></html>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/2024/03/second-post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Second</title></head></html>"),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("harvest.db");
    let db_str = db_path.to_string_lossy().to_string();

    let config = Arc::new(create_test_config(vec![format!("{}/feed", base)], &db_str));

    let limits = FetchLimits {
        timeout: Duration::from_secs(1),
        max_bytes: 65536,
    };
    let fetcher = Arc::new(Fetcher::new(&config.user_agent, limits).expect("client builds"));
    let robots = RobotsChecker::new(Arc::clone(&fetcher), "TestHarvester".to_string());
    let scraper = Arc::new(PageScraper::new(fetcher, robots, test_vocabulary(), true));
    let orchestrator = BatchOrchestrator::new(scraper, &config.crawler);
    let store = SqliteStore::new(&db_path).expect("store opens");
    let frontier_source = SqliteStore::new(&db_path).expect("second connection opens");

    let mut manager =
        FrontierManager::new(Arc::clone(&config), orchestrator, store, frontier_source);

    // Cycle 1: scrape the seed, discover the two article links
    let stats = manager.run_cycle().await;
    assert_eq!(stats.frontier_size, 1);
    assert_eq!(stats.ok, 1);
    assert_eq!(stats.persisted, 0); // the feed page is not article-shaped
    assert_eq!(stats.discovered_links, 2);

    // Cycle 2: scrape the discovered articles and persist them
    let stats = manager.run_cycle().await;
    assert_eq!(stats.persisted, 2);

    let verify = SqliteStore::new(&db_path).expect("verification connection");
    assert_eq!(verify.count_articles().unwrap(), 2);
    let record = verify
        .get_by_url(&format!("{}/blog/2024/03/first-post", base))
        .unwrap()
        .expect("first article stored");
    assert_eq!(record.content.title, "First");

    // Cycle 3: everything already stored, nothing new persisted
    let stats = manager.run_cycle().await;
    assert_eq!(stats.persisted, 0);
    assert_eq!(verify.count_articles().unwrap(), 2);
}

#[tokio::test]
async fn test_cycle_survives_fetch_failures() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/blog/2024/03/good-post"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Good</title></head></html>"),
        )
        .mount(&server)
        .await;
    // /blog/2024/03/missing-post is unmocked: wiremock answers 404 with an
    // empty body, which the scraper reports as EmptyResponse

    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("harvest.db");
    let db_str = db_path.to_string_lossy().to_string();

    let seeds = vec![
        format!("{}/blog/2024/03/good-post", base),
        format!("{}/blog/2024/03/missing-post", base),
    ];
    let config = Arc::new(create_test_config(seeds, &db_str));

    let limits = FetchLimits {
        timeout: Duration::from_secs(1),
        max_bytes: 65536,
    };
    let fetcher = Arc::new(Fetcher::new(&config.user_agent, limits).expect("client builds"));
    let robots = RobotsChecker::new(Arc::clone(&fetcher), "TestHarvester".to_string());
    let scraper = Arc::new(PageScraper::new(fetcher, robots, test_vocabulary(), true));
    let orchestrator = BatchOrchestrator::new(scraper, &config.crawler);
    let store = SqliteStore::new(&db_path).expect("store opens");
    let frontier_source = SqliteStore::new(&db_path).expect("second connection opens");

    let mut manager =
        FrontierManager::new(Arc::clone(&config), orchestrator, store, frontier_source);
    let stats = manager.run_cycle().await;

    assert_eq!(stats.frontier_size, 2);
    assert_eq!(stats.ok, 1);
    assert_eq!(stats.empty_responses, 1);
    assert_eq!(stats.persisted, 1);

    let verify = SqliteStore::new(&db_path).expect("verification connection");
    assert_eq!(verify.count_articles().unwrap(), 1);
}
