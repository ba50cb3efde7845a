//! Rule tables for URL classification
//!
//! All classification heuristics live here as data so they can be tuned and
//! unit-tested without touching the evaluation logic in `classify::mod`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Path keywords strongly associated with non-content pages.
///
/// A URL matching an article pattern is still rejected if any of these
/// appear anywhere in it.
pub const NON_ARTICLE_KEYWORDS: &[&str] = &[
    "/product",
    "/products",
    "/home",
    "/item",
    "/items",
    "/category",
    "/categories",
    "/login",
    "/signin",
    "/logout",
    "/signup",
    "/register",
    "/account",
    "/user",
    "/profile",
    "/dashboard",
    "/settings",
    "/preferences",
    "/order",
    "/orders",
    "/cart",
    "/checkout",
    "/payment",
    "/subscribe",
    "/subscription",
    "/contact",
    "/support",
    "/help",
    "/faq",
    "/about",
    "/privacy",
    "/terms",
    "/policy",
    "/conditions",
    "/legal",
    "/service",
    "/services",
    "/pricing",
    "/price",
    "/plans",
    "/features",
    "/partners",
    "/team",
    "/careers",
    "/jobs",
    "/join",
    "/apply",
    "/training",
    "/demo",
    "/trial",
    "/download",
    "/install",
    "/app",
    "/apps",
    "/software",
    "/portal",
    "/index",
    "/main",
    "/video",
    "/videos",
    "/photo",
    "/photos",
    "/image",
    "/images",
    "/gallery",
    "/portfolio",
    "/showcase",
    "/testimonials",
    "/reviews",
    "/search",
    "/find",
    "/browse",
    "/list",
    "/tags",
    "/explore",
    "/trending",
    "/latest",
    "/promotions",
    "/offers",
    "/deals",
    "/discount",
    "/coupon",
    "/coupons",
    "/gift",
    "/store",
    "/stores",
    "/locator",
    "/locations",
    "/branches",
    "/events",
    "/webinar",
    "/calendar",
    "/schedule",
    "/class",
    "/classes",
    "/lesson",
    "/lessons",
    "/workshop",
    "/map",
    "/directions",
    "/weather",
    "/traffic",
    "/rates",
    "/auction",
    "/loan",
    "/mortgage",
    "/property",
    "/real-estate",
    "/client",
    "/clients",
    "/partner",
    "/sponsor",
    "/media",
    "/press",
    "/releases",
    "/announcements",
    "/newsroom",
    "/resources",
    "/members/",
    "/u/",
    "/@",
    "/shop",
    "/wiki",
    "/author",
    "/submit",
    "courses",
    "collections",
];

/// Path keywords that indicate article/blog/post/news structure.
pub const ARTICLE_KEYWORDS: &[&str] = &[
    "/blog/",
    "post",
    "article",
    "insights",
    "guide",
    "tutorial",
    "how-to",
    "/news/",
];

/// Regex families matching date-stamped and slug-shaped article paths.
///
/// Superset of the patterns observed in conventional blog URL layouts:
/// `/YYYY/MM/slug`, `/YYYY/MM/DD/slug`, section-prefixed variants, and
/// plain two-segment slug paths.
pub static ARTICLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // /blog/2024/03/some-slug and friends
        r"/(blog|article|articles|post|posts|blogs|news)/\d{4}/\d{2}/[a-z0-9-]+/?",
        // /blog/some-slug/another-slug
        r"/(blog|article|articles|post|posts|blogs|news)/[a-z0-9-]+/[a-z0-9-]+",
        // /section/2024/03/14/slug and /section/2024/03/slug
        r"/[^/]+/\d{4}/\d{2}/\d{2}/[a-z0-9-]+/?",
        r"/[^/]+/\d{4}/\d{2}/[a-z0-9-]+/?",
        // /section/a-multi-word-slug (two+ segments, hyphenated leaf)
        r"/[a-z0-9-]+/[a-z0-9]+(-[a-z0-9]+)+/?$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("article pattern regex is valid"))
    .collect()
});

/// Hosts whose content is discussion/Q&A shaped rather than article shaped.
pub const DISCUSSION_HOSTS: &[&str] = &[
    "stackoverflow.com",
    "stackexchange.com",
    "serverfault.com",
    "superuser.com",
    "reddit.com",
    "old.reddit.com",
    "news.ycombinator.com",
    "lobste.rs",
    "discourse.org",
];

/// Path fragments that mark forum/thread/Q&A pages on any host.
pub const DISCUSSION_PATH_MARKERS: &[&str] =
    &["/questions/", "/comments/", "/thread", "/discussion", "/t/"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(!ARTICLE_PATTERNS.is_empty());
    }

    #[test]
    fn test_date_pattern_matches() {
        let url = "https://example.com/blog/2024/03/my-post";
        assert!(ARTICLE_PATTERNS.iter().any(|p| p.is_match(url)));
    }

    #[test]
    fn test_full_date_pattern_matches() {
        let url = "https://example.com/engineering/2023/11/05/scaling-search";
        assert!(ARTICLE_PATTERNS.iter().any(|p| p.is_match(url)));
    }

    #[test]
    fn test_slug_pattern_matches() {
        let url = "https://example.com/engineering/how-we-scaled-search";
        assert!(ARTICLE_PATTERNS.iter().any(|p| p.is_match(url)));
    }

    #[test]
    fn test_plain_section_page_does_not_match() {
        let url = "https://example.com/pricing";
        assert!(!ARTICLE_PATTERNS.iter().any(|p| p.is_match(url)));
    }

    #[test]
    fn test_keyword_tables_are_lowercase() {
        for kw in NON_ARTICLE_KEYWORDS.iter().chain(ARTICLE_KEYWORDS) {
            assert_eq!(*kw, kw.to_lowercase());
        }
    }
}
