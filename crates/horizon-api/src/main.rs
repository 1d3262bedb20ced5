//! horizon-api - HTTP API server for horizon

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Context;
use governor::{Quota, RateLimiter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use horizon_api::{api_router, AppState};
use horizon_core::AnalysisBackend;
use horizon_db::{Database, PoolConfig};
use horizon_ingest::{FirecrawlScraper, OpenAiAnalysisBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let db = Database::connect_with_config(&database_url, PoolConfig::from_env())
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to run migrations")?;

    let scraper = Arc::new(FirecrawlScraper::from_env());
    let analyzer: Arc<dyn AnalysisBackend> = Arc::new(OpenAiAnalysisBackend::from_env());

    // Global limiter for the provider-backed ingest endpoints; 0 disables.
    let rate_limit_per_minute = std::env::var("HORIZON_RATE_LIMIT_PER_MINUTE")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(60);
    let rate_limiter = NonZeroU32::new(rate_limit_per_minute)
        .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));

    let state = AppState {
        db,
        scraper,
        analyzer,
        rate_limiter,
    };

    let host = std::env::var("HORIZON_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("HORIZON_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        subsystem = "api",
        op = "startup",
        addr = %addr,
        rate_limit_per_minute,
        "horizon-api listening"
    );

    axum::serve(listener, api_router(state))
        .await
        .context("server error")?;

    Ok(())
}
