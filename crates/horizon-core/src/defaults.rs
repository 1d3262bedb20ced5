//! Centralized defaults and tunables for horizon.
//!
//! Field length caps mirror the database CHECK constraints; the ingest
//! fallbacks are the deterministic substitutes applied when a provider
//! returns missing or invalid fields.

// ─── Field length caps ─────────────────────────────────────────────────────

/// Maximum characters in a signal title.
pub const SIGNAL_TITLE_MAX: usize = 180;

/// Maximum characters in a signal (or analysis) summary.
pub const SUMMARY_MAX: usize = 1200;

/// Maximum characters in a trend title.
pub const TREND_TITLE_MAX: usize = 120;

/// Maximum characters in a trend description.
pub const TREND_DESCRIPTION_MAX: usize = 1800;

/// Maximum characters in a megatrend title.
pub const MEGATREND_TITLE_MAX: usize = 120;

/// Maximum characters in a megatrend description.
pub const MEGATREND_DESCRIPTION_MAX: usize = 1200;

// ─── Pagination ────────────────────────────────────────────────────────────

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 200;

// ─── Analysis constraints ──────────────────────────────────────────────────

/// Minimum input length for analysis; shorter content is rejected before any
/// provider request.
pub const ANALYZE_MIN_CONTENT_CHARS: usize = 100;

/// Exact number of takeaways an analysis must carry.
pub const TAKEAWAY_COUNT: usize = 3;

/// Minimum number of tags after normalization.
pub const TAG_MIN: usize = 2;

/// Maximum number of tags after normalization.
pub const TAG_MAX: usize = 6;

/// Default relevance score when the provider omits or mangles the field.
pub const RELEVANCE_DEFAULT: i32 = 50;

/// Filler appended when fewer than [`TAKEAWAY_COUNT`] takeaways survive
/// post-processing and the summary yields no more sentences.
pub const TAKEAWAY_FILLER: &str = "No additional takeaway identified.";

/// Tags appended, in order, when fewer than [`TAG_MIN`] survive
/// normalization.
pub const FALLBACK_TAGS: [&str; 2] = ["general", "untagged"];

/// Content preview length included in analysis prompts.
pub const ANALYZE_CONTENT_PREVIEW: usize = 12_000;

/// Maximum signal stubs included in a description-generation prompt.
pub const DESCRIBE_MAX_SIGNALS: usize = 20;

// ─── Provider endpoints ────────────────────────────────────────────────────

/// Default Firecrawl-compatible scrape endpoint.
pub const FIRECRAWL_URL: &str = "https://api.firecrawl.dev";

/// Default OpenAI-compatible completion endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default analysis model.
pub const ANALYZE_MODEL: &str = "gpt-4o-mini";

/// Timeout for scrape requests (seconds).
pub const SCRAPE_TIMEOUT_SECS: u64 = 60;

/// Timeout for analysis requests (seconds).
pub const ANALYZE_TIMEOUT_SECS: u64 = 120;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_match_schema() {
        assert_eq!(SIGNAL_TITLE_MAX, 180);
        assert_eq!(SUMMARY_MAX, 1200);
        assert_eq!(TREND_TITLE_MAX, 120);
        assert_eq!(TREND_DESCRIPTION_MAX, 1800);
        assert_eq!(MEGATREND_DESCRIPTION_MAX, 1200);
    }

    #[test]
    fn test_tag_bounds_sane() {
        assert!(TAG_MIN <= TAG_MAX);
        assert!(FALLBACK_TAGS.len() >= TAG_MIN);
    }
}
