//! URL handling module for Gleaner
//!
//! This module decides which URL strings are even worth handing to the
//! fetcher: syntactically valid absolute HTTP(S) URLs that do not point at
//! obvious non-HTML assets. It also derives per-site robots.txt locations.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// File extensions that mark a URL as a non-HTML asset.
///
/// These never produce article pages, so links carrying them are dropped
/// during extraction rather than wasted on a fetch.
const ASSET_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".css", ".js", ".mjs", ".json",
    ".xml", ".rss", ".atom", ".pdf", ".zip", ".gz", ".bz2", ".tar", ".rar", ".7z", ".exe", ".dmg",
    ".mp3", ".mp4", ".avi", ".mov", ".webm", ".woff", ".woff2", ".ttf", ".eot", ".ipynb", ".py",
];

/// Shape of a crawlable absolute URL: scheme, registrable host, and an
/// optional path. Mirrors the frontier's "good URL" contract.
static GOOD_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$")
        .expect("good-url regex is valid")
});

/// Checks whether a URL string has the "good URL" shape the crawler accepts
///
/// Accepts only absolute HTTP(S) URLs with a dotted host, rejects localhost
/// and URLs whose path ends in a known non-HTML asset extension.
///
/// # Examples
///
/// ```
/// use gleaner::url::is_fetchable_url;
///
/// assert!(is_fetchable_url("https://example.com/blog/post"));
/// assert!(!is_fetchable_url("https://example.com/logo.png"));
/// assert!(!is_fetchable_url("ftp://example.com/file"));
/// assert!(!is_fetchable_url("http://localhost:8080/dev"));
/// ```
pub fn is_fetchable_url(url_str: &str) -> bool {
    let parsed = match Url::parse(url_str) {
        Ok(u) => u,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    let host = match parsed.host_str() {
        Some(h) => h,
        None => return false,
    };

    if host == "localhost" || host.ends_with(".localhost") {
        return false;
    }

    if has_asset_extension(parsed.path()) {
        return false;
    }

    GOOD_URL_RE.is_match(url_str)
}

/// Checks whether a path ends in a known non-HTML asset extension
pub fn has_asset_extension(path: &str) -> bool {
    let lower = path.to_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Extracts the lowercase host from a URL string
pub fn extract_host(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Derives the robots.txt URL for a page URL (scheme + host + /robots.txt)
///
/// Returns `None` when the URL cannot be parsed or has no host; callers
/// treat that as "no policy to consult".
pub fn robots_url_for(url_str: &str) -> Option<String> {
    let parsed = Url::parse(url_str).ok()?;
    let host = parsed.host_str()?;
    let port = parsed
        .port()
        .map(|p| format!(":{}", p))
        .unwrap_or_default();
    Some(format!("{}://{}{}/robots.txt", parsed.scheme(), host, port))
}
