//! Firecrawl-compatible scrape client.
//!
//! Takes a URL, returns extracted main-body markdown plus the page title.
//! The provider already renders and extracts; this client normalizes the
//! URL, maps provider failures to distinguishable error causes, and strips
//! residual navigation/newsletter/social boilerplate from the markdown
//! before handing it back.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use horizon_core::{defaults, Error, Result, ScrapedPage};

/// Default Firecrawl endpoint.
pub const DEFAULT_FIRECRAWL_URL: &str = defaults::FIRECRAWL_URL;

/// Firecrawl scrape backend.
pub struct FirecrawlScraper {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl FirecrawlScraper {
    /// Create a scraper with explicit configuration.
    pub fn with_config(base_url: String, api_key: Option<String>) -> Self {
        let timeout_secs = std::env::var("HORIZON_SCRAPE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::SCRAPE_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            timeout_secs,
        }
    }

    /// Create from environment variables (`FIRECRAWL_BASE`,
    /// `FIRECRAWL_API_KEY`).
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("FIRECRAWL_BASE").unwrap_or_else(|_| DEFAULT_FIRECRAWL_URL.to_string());
        let api_key = std::env::var("FIRECRAWL_API_KEY").ok().filter(|k| !k.is_empty());
        Self::with_config(base_url, api_key)
    }

    /// Scrape a URL and return cleaned main-body markdown.
    ///
    /// Idempotent and side-effect free; callers persist results themselves.
    pub async fn scrape(&self, url: &str) -> Result<ScrapedPage> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("FIRECRAWL_API_KEY is not set".to_string()))?;

        let target = normalize_url(url)?;
        let start = Instant::now();

        debug!(
            subsystem = "ingest",
            component = "scrape",
            provider = "firecrawl",
            url = %target,
            "Requesting scrape"
        );

        let request = ScrapeRequest {
            url: target.clone(),
            formats: vec!["markdown".to_string()],
        };

        let response = self
            .client
            .post(format!("{}/v1/scrape", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Scrape(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => Error::RateLimited(format!("scrape provider: {}", body)),
                402 => Error::QuotaExhausted(format!("scrape provider: {}", body)),
                _ => Error::Scrape(format!("provider returned {}: {}", status, body)),
            });
        }

        let result: ScrapeResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("scrape payload: {}", e)))?;

        if !result.success {
            return Err(Error::Scrape(
                result
                    .error
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            ));
        }

        let data = result
            .data
            .ok_or_else(|| Error::NoContent("provider returned no data".to_string()))?;
        let markdown = data
            .markdown
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| Error::NoContent("no content extracted".to_string()))?;

        let cleaned = strip_boilerplate(&markdown);
        if cleaned.trim().is_empty() {
            return Err(Error::NoContent(
                "no main content after boilerplate removal".to_string(),
            ));
        }

        let elapsed = start.elapsed().as_millis() as u64;
        info!(
            subsystem = "ingest",
            component = "scrape",
            provider = "firecrawl",
            url = %target,
            response_len = cleaned.len(),
            duration_ms = elapsed,
            "Scrape complete"
        );
        if elapsed > 30_000 {
            warn!(duration_ms = elapsed, slow = true, "Slow scrape operation");
        }

        Ok(ScrapedPage {
            markdown: cleaned,
            title: data.metadata.and_then(|m| m.title).filter(|t| !t.is_empty()),
        })
    }
}

#[derive(Serialize)]
struct ScrapeRequest {
    url: String,
    formats: Vec<String>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    metadata: Option<ScrapeMetadata>,
}

#[derive(Deserialize)]
struct ScrapeMetadata {
    title: Option<String>,
}

/// Normalize a caller-supplied URL: reject empty input, prefix `https://`
/// when no scheme is present.
pub fn normalize_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("url is required".to_string()));
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

fn boilerplate_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)subscribe( to)?( our| the)? newsletter",
            r"(?i)^sign up (for|to)",
            r"(?i)share (this|on) (twitter|facebook|linkedin|x\b)",
            r"(?i)^\s*(share|tweet)\s*$",
            r"(?i)cookie (policy|consent|settings|preferences)",
            r"(?i)accept (all )?cookies",
            r"(?i)^\s*(home|menu|navigation)\s*$",
            r"(?i)skip to (main )?content",
            r"(?i)^\s*advertisement\s*$",
            r"(?i)follow us on",
            r"(?i)^related (articles|posts|stories)",
            r"(?i)all rights reserved",
            // Link-only lines are almost always nav or footer chrome.
            r"^\s*\[[^\]]*\]\([^)]*\)\s*$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static boilerplate pattern"))
        .collect()
    })
}

/// Remove navigation/newsletter/social-share boilerplate lines from
/// markdown, collapsing the blank runs left behind.
pub fn strip_boilerplate(markdown: &str) -> String {
    let patterns = boilerplate_patterns();
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for line in markdown.lines() {
        if patterns.iter().any(|p| p.is_match(line)) {
            continue;
        }
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }

    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_prefixes_scheme() {
        assert_eq!(
            normalize_url("example.com/article").unwrap(),
            "https://example.com/article"
        );
    }

    #[test]
    fn test_normalize_url_keeps_existing_scheme() {
        assert_eq!(
            normalize_url("http://example.com").unwrap(),
            "http://example.com"
        );
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_normalize_url_rejects_empty() {
        assert!(normalize_url("   ").is_err());
    }

    #[test]
    fn test_strip_boilerplate_removes_newsletter_and_social() {
        let input = "# Headline\n\nSubscribe to our newsletter today!\n\nReal first paragraph.\n\nShare on Twitter\nFollow us on LinkedIn\n\nSecond paragraph with substance.";
        let cleaned = strip_boilerplate(input);
        assert!(cleaned.contains("Real first paragraph."));
        assert!(cleaned.contains("Second paragraph with substance."));
        assert!(!cleaned.contains("newsletter"));
        assert!(!cleaned.contains("Share on Twitter"));
        assert!(!cleaned.contains("Follow us"));
    }

    #[test]
    fn test_strip_boilerplate_removes_link_only_lines() {
        let input = "[Home](https://example.com)\n\nBody text stays.\n\n[Privacy policy](https://example.com/privacy)";
        let cleaned = strip_boilerplate(input);
        assert_eq!(cleaned, "Body text stays.");
    }

    #[test]
    fn test_strip_boilerplate_collapses_blank_runs() {
        let input = "One\n\n\n\nTwo";
        assert_eq!(strip_boilerplate(input), "One\n\nTwo");
    }

    #[test]
    fn test_strip_boilerplate_preserves_prose_mentioning_sharing() {
        // "share" inside a sentence is not chrome
        let input = "Researchers share data openly in this field.";
        assert_eq!(strip_boilerplate(input), input);
    }
}
