//! HTTP-level tests for the Firecrawl scrape client.
//!
//! Uses wiremock to verify status→cause mapping, payload handling, and the
//! boilerplate stripping applied to returned markdown.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use horizon_core::Error;
use horizon_ingest::FirecrawlScraper;

fn scraper_for(server: &MockServer) -> FirecrawlScraper {
    FirecrawlScraper::with_config(server.uri(), Some("test-key".to_string()))
}

#[tokio::test]
async fn test_scrape_returns_cleaned_markdown_and_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "# Story\n\nSubscribe to our newsletter!\n\nActual body text.",
                "metadata": { "title": "Story" }
            }
        })))
        .mount(&server)
        .await;

    let page = scraper_for(&server)
        .scrape("https://example.com/story")
        .await
        .unwrap();

    assert_eq!(page.title.as_deref(), Some("Story"));
    assert!(page.markdown.contains("Actual body text."));
    assert!(!page.markdown.contains("newsletter"));
}

#[tokio::test]
async fn test_scrape_normalizes_schemeless_url() {
    let server = MockServer::start().await;
    // The matcher asserts the request body carries the https:// prefix.
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": "https://example.com/story"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "Body." }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = scraper_for(&server).scrape("example.com/story").await.unwrap();
    assert_eq!(page.markdown, "Body.");
}

#[tokio::test]
async fn test_scrape_maps_429_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .mount(&server)
        .await;

    let err = scraper_for(&server)
        .scrape("https://example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited(_)));
}

#[tokio::test]
async fn test_scrape_maps_402_to_quota_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
        .mount(&server)
        .await;

    let err = scraper_for(&server)
        .scrape("https://example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::QuotaExhausted(_)));
}

#[tokio::test]
async fn test_scrape_surfaces_provider_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "blocked by robots.txt"
        })))
        .mount(&server)
        .await;

    let err = scraper_for(&server)
        .scrape("https://example.com")
        .await
        .unwrap_err();
    match err {
        Error::Scrape(msg) => assert!(msg.contains("robots.txt")),
        other => panic!("Expected Scrape error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scrape_empty_markdown_is_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "   " }
        })))
        .mount(&server)
        .await;

    let err = scraper_for(&server)
        .scrape("https://example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoContent(_)));
}

#[tokio::test]
async fn test_scrape_without_api_key_names_the_connector() {
    // No server: the error must fire before any request.
    let scraper = FirecrawlScraper::with_config("http://127.0.0.1:9".to_string(), None);
    let err = scraper.scrape("https://example.com").await.unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("FIRECRAWL_API_KEY")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scrape_rejects_empty_url_before_request() {
    let scraper = FirecrawlScraper::with_config(
        "http://127.0.0.1:9".to_string(),
        Some("test-key".to_string()),
    );
    let err = scraper.scrape("  ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}
