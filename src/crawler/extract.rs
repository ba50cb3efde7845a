//! Field extraction from parsed HTML
//!
//! Each function here pulls one field out of a parsed document and degrades
//! to an empty value rather than erroring: real pages are missing metadata
//! constantly and a thin record is still worth keeping. Probe orders are
//! fixed so the same document always yields the same record.

use crate::url::is_fetchable_url;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// ISO-style date: 2024-03-14
static DATE_ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("iso date regex is valid"));

/// Prose-style date: "14 Mar, 2024" or "3 March 2024"
static DATE_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2} [A-Za-z]{3,9},? \d{4}").expect("text date regex is valid"));

fn selector(css: &str) -> Selector {
    // All selectors passed in are static strings known to parse
    Selector::parse(css).expect("static selector is valid")
}

/// Extracts the page title, or an empty string when the document has none
pub fn extract_title(doc: &Html) -> String {
    let sel = selector("title");
    doc.select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts the meta description, preferring the standard tag over og:description
pub fn extract_description(doc: &Html) -> String {
    for css in [
        r#"meta[name="description"]"#,
        r#"meta[property="og:description"]"#,
    ] {
        let sel = selector(css);
        if let Some(content) = doc
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
        {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    String::new()
}

/// Extracts a representative image URL: og:image, else the first `<img src>`
/// resolved against the page URL. Empty string when neither exists.
pub fn extract_image(doc: &Html, base: &Url) -> String {
    let og = selector(r#"meta[property="og:image"]"#);
    if let Some(content) = doc
        .select(&og)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            if let Ok(abs) = base.join(trimmed) {
                return abs.to_string();
            }
        }
    }

    let img = selector("img[src]");
    if let Some(src) = doc
        .select(&img)
        .next()
        .and_then(|el| el.value().attr("src"))
    {
        if let Ok(abs) = base.join(src.trim()) {
            return abs.to_string();
        }
    }

    String::new()
}

/// Extracts deduplicated, sorted outbound links
///
/// Every anchor href is resolved against the page URL, then filtered through
/// the crawlable-URL gate. The result is sorted so link order never depends
/// on document traversal details.
pub fn extract_outbound_links(doc: &Html, base: &Url) -> Vec<String> {
    let anchors = selector("a[href]");
    let mut links = BTreeSet::new();

    for el in doc.select(&anchors) {
        let href = match el.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };
        if href.is_empty() {
            continue;
        }
        let abs = match base.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };
        let abs_str = abs.to_string();
        if is_fetchable_url(&abs_str) {
            links.insert(abs_str);
        }
    }

    links.into_iter().collect()
}

/// Matches a title against the tag vocabulary
///
/// The title is lowercased, stripped of punctuation (hyphens and the
/// handful of characters appearing in tag names survive), and split into
/// tokens on whitespace and hyphens. Single tokens and hyphen-joined
/// adjacent token pairs are looked up in the vocabulary, so a title like
/// "Machine Learning Pipelines" hits the "machine-learning" tag. A page
/// matching nothing gets the catch-all "general" tag.
pub fn extract_tags(title: &str, vocabulary: &BTreeSet<String>) -> BTreeSet<String> {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '#' | '+' | '.') {
                c
            } else {
                ' '
            }
        })
        .collect();

    let tokens: Vec<&str> = cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty())
        .collect();

    let mut tags = BTreeSet::new();
    for token in &tokens {
        if vocabulary.contains(*token) {
            tags.insert(token.to_string());
        }
    }
    for pair in tokens.windows(2) {
        let joined = format!("{}-{}", pair[0], pair[1]);
        if vocabulary.contains(&joined) {
            tags.insert(joined);
        }
    }

    if tags.is_empty() {
        tags.insert("general".to_string());
    }
    tags
}

/// Probes for a publish date, normalized to a short date string
///
/// Probe order: `article:published_time` meta, JSON-LD `datePublished`
/// (top level or inside `@graph`), the first `<time datetime>` attribute,
/// then any element text mentioning "Last Updated". A candidate only counts
/// if it contains a recognizable date shape; otherwise the next probe runs.
/// Absence of a date is `None`, never an error.
pub fn extract_publish_date(doc: &Html) -> Option<String> {
    let meta = selector(r#"meta[property="article:published_time"]"#);
    if let Some(content) = doc
        .select(&meta)
        .next()
        .and_then(|el| el.value().attr("content"))
    {
        if let Some(date) = normalize_date(content) {
            return Some(date);
        }
    }

    let ld = selector(r#"script[type="application/ld+json"]"#);
    for el in doc.select(&ld) {
        let raw = el.text().collect::<String>();
        if let Some(published) = json_ld_date_published(&raw) {
            if let Some(date) = normalize_date(&published) {
                return Some(date);
            }
        }
    }

    let time = selector("time[datetime]");
    if let Some(datetime) = doc
        .select(&time)
        .next()
        .and_then(|el| el.value().attr("datetime"))
    {
        if let Some(date) = normalize_date(datetime) {
            return Some(date);
        }
    }

    let all = selector("p, span, div, em, small");
    for el in doc.select(&all) {
        let text = el.text().collect::<String>();
        if text.to_lowercase().contains("last updated") {
            if let Some(date) = normalize_date(&text) {
                return Some(date);
            }
        }
    }

    None
}

/// Pulls `datePublished` out of a JSON-LD blob, including `@graph` nesting
fn json_ld_date_published(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw.trim()).ok()?;

    if let Some(date) = value.get("datePublished").and_then(|v| v.as_str()) {
        return Some(date.to_string());
    }

    if let Some(graph) = value.get("@graph").and_then(|v| v.as_array()) {
        for node in graph {
            if let Some(date) = node.get("datePublished").and_then(|v| v.as_str()) {
                return Some(date.to_string());
            }
        }
    }

    // Some sites wrap the object in a top-level array
    if let Some(items) = value.as_array() {
        for node in items {
            if let Some(date) = node.get("datePublished").and_then(|v| v.as_str()) {
                return Some(date.to_string());
            }
        }
    }

    None
}

/// Reduces a raw candidate to a recognizable date substring
fn normalize_date(raw: &str) -> Option<String> {
    if let Some(m) = DATE_ISO_RE.find(raw) {
        return Some(m.as_str().to_string());
    }
    if let Some(m) = DATE_TEXT_RE.find(raw) {
        return Some(m.as_str().to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn base() -> Url {
        Url::parse("https://example.com/blog/2024/03/my-post").unwrap()
    }

    #[test]
    fn test_extract_title() {
        let doc = parse("<html><head><title>  A Fine Post  </title></head></html>");
        assert_eq!(extract_title(&doc), "A Fine Post");
    }

    #[test]
    fn test_missing_title_is_empty() {
        let doc = parse("<html><body><p>no title here</p></body></html>");
        assert_eq!(extract_title(&doc), "");
    }

    #[test]
    fn test_extract_description_prefers_standard_meta() {
        let doc = parse(
            r#"<html><head>
            <meta name="description" content="primary">
            <meta property="og:description" content="secondary">
            </head></html>"#,
        );
        assert_eq!(extract_description(&doc), "primary");
    }

    #[test]
    fn test_extract_description_falls_back_to_og() {
        let doc = parse(r#"<html><head><meta property="og:description" content="og"></head></html>"#);
        assert_eq!(extract_description(&doc), "og");
    }

    #[test]
    fn test_extract_image_prefers_og() {
        let doc = parse(
            r#"<html><head><meta property="og:image" content="https://cdn.example.com/a.png"></head>
            <body><img src="/b.png"></body></html>"#,
        );
        assert_eq!(extract_image(&doc, &base()), "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_extract_image_resolves_relative_img() {
        let doc = parse(r#"<html><body><img src="/images/hero.png"></body></html>"#);
        assert_eq!(
            extract_image(&doc, &base()),
            "https://example.com/images/hero.png"
        );
    }

    #[test]
    fn test_outbound_links_resolved_filtered_sorted() {
        let doc = parse(
            r#"<html><body>
            <a href="/zebra-article-on-rust">z</a>
            <a href="https://other.example.org/alpha-post-here">a</a>
            <a href="/logo.png">asset</a>
            <a href="mailto:x@example.com">mail</a>
            <a href="https://other.example.org/alpha-post-here">dup</a>
            </body></html>"#,
        );
        let links = extract_outbound_links(&doc, &base());
        assert_eq!(
            links,
            vec![
                "https://example.com/zebra-article-on-rust".to_string(),
                "https://other.example.org/alpha-post-here".to_string(),
            ]
        );
    }

    #[test]
    fn test_tags_single_tokens() {
        let vocab: BTreeSet<String> = ["rust", "python"].iter().map(|s| s.to_string()).collect();
        let tags = extract_tags("Why Rust Beats Python Here", &vocab);
        assert!(tags.contains("rust"));
        assert!(tags.contains("python"));
    }

    #[test]
    fn test_tags_adjacent_pair_matches_hyphenated_tag() {
        let vocab: BTreeSet<String> = ["machine-learning", "text-generation"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let tags = extract_tags("Best Machine Learning Model for Text Generation", &vocab);
        assert!(tags.contains("machine-learning"));
        assert!(tags.contains("text-generation"));
    }

    #[test]
    fn test_tags_default_general() {
        let vocab: BTreeSet<String> = ["rust"].iter().map(|s| s.to_string()).collect();
        let tags = extract_tags("Completely Unrelated Gardening Advice", &vocab);
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("general"));
    }

    #[test]
    fn test_tags_punctuation_stripped() {
        let vocab: BTreeSet<String> = ["rust"].iter().map(|s| s.to_string()).collect();
        let tags = extract_tags("Rust! (and friends)", &vocab);
        assert!(tags.contains("rust"));
    }

    #[test]
    fn test_publish_date_from_meta() {
        let doc = parse(
            r#"<html><head>
            <meta property="article:published_time" content="2024-03-14T10:30:00Z">
            </head></html>"#,
        );
        assert_eq!(extract_publish_date(&doc).as_deref(), Some("2024-03-14"));
    }

    #[test]
    fn test_publish_date_from_json_ld_graph() {
        let doc = parse(
            r#"<html><head><script type="application/ld+json">
            {"@graph":[{"@type":"WebSite"},{"@type":"Article","datePublished":"2023-11-05T08:00:00+00:00"}]}
            </script></head></html>"#,
        );
        assert_eq!(extract_publish_date(&doc).as_deref(), Some("2023-11-05"));
    }

    #[test]
    fn test_publish_date_from_time_element() {
        let doc = parse(r#"<html><body><time datetime="2022-07-01">July</time></body></html>"#);
        assert_eq!(extract_publish_date(&doc).as_deref(), Some("2022-07-01"));
    }

    #[test]
    fn test_publish_date_from_last_updated_text() {
        let doc = parse(r#"<html><body><span>Last Updated: 14 Mar, 2024</span></body></html>"#);
        assert_eq!(extract_publish_date(&doc).as_deref(), Some("14 Mar, 2024"));
    }

    #[test]
    fn test_publish_date_absent() {
        let doc = parse("<html><body><p>undated musings</p></body></html>");
        assert_eq!(extract_publish_date(&doc), None);
    }

    #[test]
    fn test_unrecognizable_candidate_falls_through() {
        let doc = parse(
            r#"<html><head>
            <meta property="article:published_time" content="soonish">
            </head><body><time datetime="2022-07-01">July</time></body></html>"#,
        );
        assert_eq!(extract_publish_date(&doc).as_deref(), Some("2022-07-01"));
    }
}
