//! # horizon-ingest
//!
//! External-provider boundary for horizon.
//!
//! This crate provides:
//! - A Firecrawl-compatible scrape client with URL normalization and
//!   boilerplate stripping
//! - An OpenAI-compatible analysis backend with deterministic
//!   post-processing (field clamps, enum checks, default substitution)
//! - A mock analysis backend for tests
//!
//! Both clients are stateless and idempotent per input; nothing here writes
//! to the database. Persistence is an explicit, separate step performed by
//! the caller after reviewing the output.

pub mod analyze;
pub mod mock;
pub mod scrape;

// Re-export core types
pub use horizon_core::*;

pub use analyze::{
    extract_json_object, finalize_analysis, normalize_tag, truncate_chars,
    OpenAiAnalysisBackend, RawAnalysis,
};
pub use mock::MockAnalysisBackend;
pub use scrape::{normalize_url, strip_boilerplate, FirecrawlScraper};
