//! Integration tests for `Scraper::scrape`.
//!
//! Uses `wiremock` so each test owns its HTTP server. The `expect(n)` mock
//! assertions double as call-count instrumentation: they prove the cache
//! absorbs repeat scrapes, including repeat scrapes of failing URLs.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulse_news::{ScrapeCache, Scraper};

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta property="og:image" content="https://example.com/lead.jpg"></head>
<body><article>
<p>Opening paragraph of the article body with enough words to matter.</p>
<p>Closing paragraph.</p>
</article></body>
</html>"#;

#[tokio::test]
async fn scrapes_text_and_image() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
        .mount(&server)
        .await;

    let scraper = Scraper::new();
    let result = scraper.scrape(&format!("{}/article", server.uri())).await;

    let text = result.text.expect("expected extracted text");
    assert!(text.contains("Opening paragraph"));
    assert!(text.contains("Closing paragraph"));
    assert_eq!(result.image.as_deref(), Some("https://example.com/lead.jpg"));
}

#[tokio::test]
async fn successful_scrape_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = Scraper::new();
    let url = format!("{}/article", server.uri());

    let first = scraper.scrape(&url).await;
    let second = scraper.scrape(&url).await;

    // Identical result, one network request (verified by expect(1) on drop)
    assert_eq!(first, second);
}

#[tokio::test]
async fn failed_scrape_is_cached_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = Scraper::new();
    let url = format!("{}/gone", server.uri());

    let first = scraper.scrape(&url).await;
    assert!(first.is_empty());

    // Second call must come from the cache: expect(1) fails otherwise
    let second = scraper.scrape(&url).await;
    assert!(second.is_empty());
}

#[tokio::test]
async fn blocked_page_yields_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let scraper = Scraper::new();
    let result = scraper.scrape(&format!("{}/blocked", server.uri())).await;

    assert!(result.is_empty());
}

#[tokio::test]
async fn shared_cache_is_visible_across_scrapers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let cache = ScrapeCache::new();
    let first_scraper = Scraper::new().with_cache(cache.clone());
    let second_scraper = Scraper::new().with_cache(cache);

    let url = format!("{}/article", server.uri());
    let first = first_scraper.scrape(&url).await;
    let second = second_scraper.scrape(&url).await;

    assert_eq!(first, second);
}
