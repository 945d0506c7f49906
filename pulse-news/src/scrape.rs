//! Article scraper with a shared result cache
//!
//! Downloads an article page and extracts the main body text and a lead
//! image. Every outcome — including failures — is cached by URL so hosts
//! that block or time out are not retried for the cache lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use scraper::{Html, Selector};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::NewsError;
use crate::types::ScrapeResult;

/// Default per-request scrape timeout
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 8;

/// Cap on extracted body text, in characters
const DEFAULT_MAX_CONTENT_CHARS: usize = 2000;

/// How long cached scrape results stay valid
const CACHE_TTL_SECS: u64 = 60 * 60;

/// Soft bound on cache entries; expired entries are evicted when reached
const MAX_CACHE_ENTRIES: usize = 4096;

/// Browser-like user agent; some hosts block obvious bots
const SCRAPE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Cache entry with expiration
struct CacheEntry {
    result: ScrapeResult,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(result: ScrapeResult, ttl: Duration) -> Self {
        Self {
            result,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Task-safe URL -> scrape result cache.
///
/// Cheaply clonable; clones share the same underlying map, so one cache can
/// be injected into scrapers across concurrently running pipelines.
/// Concurrent writes for the same URL are last-writer-wins, which is fine
/// because results for a given URL are stable.
#[derive(Clone)]
pub struct ScrapeCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    max_entries: usize,
}

impl ScrapeCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(CACHE_TTL_SECS),
            max_entries: MAX_CACHE_ENTRIES,
        }
    }

    pub async fn get(&self, url: &str) -> Option<ScrapeResult> {
        let entries = self.entries.read().await;
        entries
            .get(url)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.result.clone())
    }

    pub async fn insert(&self, url: &str, result: ScrapeResult) {
        let mut entries = self.entries.write().await;
        if entries.len() >= self.max_entries {
            entries.retain(|_, entry| !entry.is_expired());
        }
        entries.insert(url.to_string(), CacheEntry::new(result, self.ttl));
    }

    /// Number of live entries (test/diagnostics helper).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for ScrapeCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Article scraper
pub struct Scraper {
    client: Client,
    cache: ScrapeCache,
    max_content_chars: usize,
}

impl Scraper {
    /// Create a scraper with the default timeout and a fresh cache.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS))
    }

    /// Create a scraper with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(SCRAPE_USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            cache: ScrapeCache::new(),
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    /// Replace the cache, e.g. to share one across scrapers or inspect it
    /// from tests.
    pub fn with_cache(mut self, cache: ScrapeCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ScrapeCache {
        &self.cache
    }

    /// Scrape an article URL.
    ///
    /// Returns the cached result when present — including cached empty
    /// results from earlier failures. Fresh failures yield an empty result
    /// which is cached before returning; blocked/missing/slow hosts are
    /// logged at debug only since they are routine.
    pub async fn scrape(&self, url: &str) -> ScrapeResult {
        if let Some(cached) = self.cache.get(url).await {
            debug!("Scrape cache hit for {}", url);
            return cached;
        }

        let result = match self.try_scrape(url).await {
            Ok(result) => result,
            Err(e) if e.is_expected() => {
                debug!("Scrape skipped for {}: {}", url, e);
                ScrapeResult::default()
            }
            Err(e) => {
                warn!("Failed to scrape {}: {}", url, e);
                ScrapeResult::default()
            }
        };

        self.cache.insert(url, result.clone()).await;
        result
    }

    async fn try_scrape(&self, url: &str) -> Result<ScrapeResult, NewsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsError::from_reqwest(e, url))?;

        if !response.status().is_success() {
            return Err(NewsError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| NewsError::from_reqwest(e, url))?;

        Ok(extract_article(&html, self.max_content_chars))
    }
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract body text and a lead image from an article page.
///
/// Synchronous on purpose: `Html` is not `Send`, so it must never be held
/// across an await point.
fn extract_article(html: &str, max_chars: usize) -> ScrapeResult {
    let document = Html::parse_document(html);

    let text = extract_body_text(&document);
    let text = if text.is_empty() {
        None
    } else {
        Some(truncate_chars(&text, max_chars))
    };

    ScrapeResult {
        text,
        image: extract_lead_image(&document),
    }
}

/// Extract article body text from the main content area.
///
/// Tries paragraph text under common content containers first, falling back
/// to all body paragraphs.
fn extract_body_text(document: &Html) -> String {
    let container_selectors = [
        "article p",
        "main p",
        "#content p",
        ".content p",
        ".post-body p",
        ".article-body p",
    ];

    for selector_str in container_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            let text = collect_paragraphs(document, &selector);
            if !text.is_empty() {
                return text;
            }
        }
    }

    if let Ok(selector) = Selector::parse("body p") {
        return collect_paragraphs(document, &selector);
    }

    String::new()
}

fn collect_paragraphs(document: &Html, selector: &Selector) -> String {
    let paragraphs: Vec<String> = document
        .select(selector)
        .map(|el| {
            el.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
        .collect();

    paragraphs.join("\n\n")
}

/// Find a representative image: og:image, then twitter:image, then the
/// first inline image that isn't a tracking pixel.
fn extract_lead_image(document: &Html) -> Option<String> {
    let meta_selectors = [
        r#"meta[property="og:image"]"#,
        r#"meta[name="twitter:image"]"#,
    ];

    for selector_str in meta_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(url) = document
                .select(&selector)
                .filter_map(|el| el.value().attr("content"))
                .find(|url| !url.is_empty())
            {
                return Some(url.to_string());
            }
        }
    }

    let img_selector = Selector::parse("img[src]").ok()?;
    document
        .select(&img_selector)
        .filter_map(|el| el.value().attr("src"))
        .find(|url| {
            // Skip tiny tracking pixels and icons
            !url.is_empty()
                && !url.contains("1x1")
                && !url.contains("pixel")
                && !url.contains("spacer")
        })
        .map(str::to_string)
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta property="og:image" content="https://example.com/lead.jpg">
</head>
<body>
  <nav><p>Menu item</p></nav>
  <article>
    <h1>Headline</h1>
    <p>First paragraph of the story body.</p>
    <p>Second paragraph with more detail.</p>
  </article>
</body>
</html>"#;

    #[test]
    fn extracts_article_paragraphs_and_og_image() {
        let result = extract_article(ARTICLE_HTML, 2000);

        let text = result.text.unwrap();
        assert!(text.starts_with("First paragraph of the story body."));
        assert!(text.contains("Second paragraph with more detail."));
        // nav text is outside <article> and must not leak in
        assert!(!text.contains("Menu item"));
        assert_eq!(result.image.as_deref(), Some("https://example.com/lead.jpg"));
    }

    #[test]
    fn falls_back_to_body_paragraphs() {
        let html = "<html><body><p>Loose paragraph.</p></body></html>";
        let result = extract_article(html, 2000);
        assert_eq!(result.text.as_deref(), Some("Loose paragraph."));
    }

    #[test]
    fn content_is_capped() {
        let long_para = "word ".repeat(1000);
        let html = format!("<html><body><article><p>{}</p></article></body></html>", long_para);
        let result = extract_article(&html, 2000);
        assert_eq!(result.text.unwrap().chars().count(), 2000);
    }

    #[test]
    fn pageless_html_yields_empty_result() {
        let result = extract_article("<html><body><div>no paragraphs</div></body></html>", 2000);
        assert!(result.text.is_none());
    }

    #[test]
    fn skips_tracking_pixel_images() {
        let html = r#"<html><body>
            <article><p>Body text here.</p></article>
            <img src="https://example.com/1x1.gif">
            <img src="https://example.com/photo.jpg">
        </body></html>"#;
        let result = extract_article(html, 2000);
        assert_eq!(result.image.as_deref(), Some("https://example.com/photo.jpg"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ééééé";
        assert_eq!(truncate_chars(s, 3), "ééé");
        assert_eq!(truncate_chars(s, 10), s);
    }

    #[tokio::test]
    async fn cache_roundtrip() {
        let cache = ScrapeCache::new();
        assert!(cache.get("https://example.com/a").await.is_none());

        let result = ScrapeResult {
            text: Some("body".to_string()),
            image: None,
        };
        cache.insert("https://example.com/a", result.clone()).await;
        assert_eq!(cache.get("https://example.com/a").await, Some(result));
    }

    #[tokio::test]
    async fn cache_remembers_empty_results() {
        let cache = ScrapeCache::new();
        cache
            .insert("https://example.com/dead", ScrapeResult::default())
            .await;

        let hit = cache.get("https://example.com/dead").await;
        assert_eq!(hit, Some(ScrapeResult::default()));
    }
}
