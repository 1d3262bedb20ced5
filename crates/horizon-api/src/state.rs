//! Shared application state.

use std::sync::Arc;

use horizon_core::AnalysisBackend;
use horizon_db::Database;
use horizon_ingest::FirecrawlScraper;

/// Global rate limiter type (direct quota, no keyed bucketing).
pub type GlobalRateLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Scrape provider client.
    pub scraper: Arc<FirecrawlScraper>,
    /// LLM analysis backend (mockable in tests).
    pub analyzer: Arc<dyn AnalysisBackend>,
    /// Global rate limiter for the provider-backed ingest endpoints
    /// (None disables limiting).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}
