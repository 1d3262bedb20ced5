//! Ingest handlers: scrape, summarize, describe.
//!
//! These endpoints forward to the external providers and return the result
//! without persisting anything. Saving a signal or description is a
//! separate, explicit call after the user reviews the output. Provider
//! failures keep their cause in the response status.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use horizon_core::SignalStub;

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

fn check_rate_limit(state: &AppState) -> Result<(), ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            return Err(ApiError::RateLimited("API rate limit exceeded".into()));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ScrapeBody {
    pub url: Option<String>,
}

pub async fn scrape(
    State(state): State<AppState>,
    Identity(_profile): Identity,
    Json(body): Json<ScrapeBody>,
) -> Result<impl IntoResponse, ApiError> {
    check_rate_limit(&state)?;

    let url = body
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url is required".into()))?;

    let page = state.scraper.scrape(url).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "markdown": page.markdown,
            "metadata": { "title": page.title },
        }
    })))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeBody {
    pub content: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

pub async fn summarize(
    State(state): State<AppState>,
    Identity(_profile): Identity,
    Json(body): Json<SummarizeBody>,
) -> Result<impl IntoResponse, ApiError> {
    check_rate_limit(&state)?;

    let content = body
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("content is required".into()))?;

    let analysis = state
        .analyzer
        .analyze(content, body.title.as_deref(), body.url.as_deref())
        .await?;

    Ok(Json(analysis))
}

#[derive(Debug, Deserialize)]
pub struct DescribeBody {
    pub title: Option<String>,
    #[serde(default)]
    pub signals: Vec<SignalStub>,
}

pub async fn describe(
    State(state): State<AppState>,
    Identity(_profile): Identity,
    Json(body): Json<DescribeBody>,
) -> Result<impl IntoResponse, ApiError> {
    check_rate_limit(&state)?;

    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("title is required".into()))?;

    let description = state.analyzer.describe(title, &body.signals).await?;

    Ok(Json(serde_json::json!({ "description": description })))
}
