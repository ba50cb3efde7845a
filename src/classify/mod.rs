//! URL-shape classification
//!
//! Decides, from a URL string alone, whether a page is likely to be
//! substantive content (an article, post, or discussion) rather than a
//! navigation or utility page. Pure and synchronous: same URL in, same
//! verdict out. This is a heuristic with acceptable false positives and
//! negatives; the contract is determinism and a low false-negative rate on
//! conventional article URL shapes.

pub mod rules;

use crate::storage::RecordKind;
use rules::{
    ARTICLE_KEYWORDS, ARTICLE_PATTERNS, DISCUSSION_HOSTS, DISCUSSION_PATH_MARKERS,
    NON_ARTICLE_KEYWORDS,
};
use url::Url;

/// Classifies a URL as article-like or not
///
/// Evaluation order:
/// 1. Root or empty paths are rejected outright.
/// 2. A date/slug pattern match classifies as article, unless a deny-list
///    keyword appears anywhere in the URL.
/// 3. Any allow-list keyword classifies as article.
/// 4. A final path segment of three or more hyphen-separated words
///    classifies as article.
/// 5. Everything else is rejected.
///
/// # Examples
///
/// ```
/// use gleaner::classify::is_article_like;
///
/// assert!(is_article_like("https://example.com/blog/2024/03/my-post"));
/// assert!(!is_article_like("https://example.com/login"));
/// assert!(!is_article_like("https://example.com/"));
/// ```
pub fn is_article_like(url_str: &str) -> bool {
    let parsed = match Url::parse(url_str) {
        Ok(u) => u,
        Err(_) => return false,
    };

    let path = parsed.path();
    if path.is_empty() || path == "/" {
        return false;
    }

    let lower = url_str.to_lowercase();

    if ARTICLE_PATTERNS.iter().any(|p| p.is_match(&lower))
        && !NON_ARTICLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
    {
        return true;
    }

    if ARTICLE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return true;
    }

    // Hyphenated leaf segment: "some-long-article-title" style slugs
    let last_segment = path.trim_matches('/').rsplit('/').next().unwrap_or("");
    if last_segment.contains('-') && last_segment.split('-').count() > 2 {
        return true;
    }

    false
}

/// Decides whether a URL points at a discussion/Q&A page or an article
///
/// The store distinguishes the two so downstream feeds can separate them;
/// the split is by host and path shape only.
pub fn record_kind_for(url_str: &str) -> RecordKind {
    let lower = url_str.to_lowercase();

    if let Some(host) = crate::url::extract_host(&lower) {
        let bare = host.strip_prefix("www.").unwrap_or(&host);
        if DISCUSSION_HOSTS
            .iter()
            .any(|d| bare == *d || bare.ends_with(&format!(".{}", d)))
        {
            return RecordKind::Discussion;
        }
    }

    if DISCUSSION_PATH_MARKERS.iter().any(|m| lower.contains(m)) {
        return RecordKind::Discussion;
    }

    RecordKind::Article
}
