//! Router assembly and HTTP middleware stack.

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use uuid::Uuid;

use crate::handlers::{
    ingest, jobs, members, megatrends, profiles, signals, sources, trends, workspaces,
};
use crate::state::AppState;

/// Maximum request body size (1 MiB); payloads here are JSON, not uploads.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Parse allowed CORS origins from the comma-separated `ALLOWED_ORIGINS`
/// environment variable. Defaults to localhost dev origins; never `Any`.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                HeaderValue::from_str(trimmed).ok()
            }
        })
        .collect()
}

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Horizon API",
        version = "0.4.2",
        description = "Multi-tenant foresight tracking: signals, trends, megatrends, and AI-assisted enrichment"
    ),
    components(schemas(
        horizon_core::Workspace,
        horizon_core::Plan,
        horizon_core::Role,
        horizon_core::Member,
        horizon_core::MemberWithProfile,
        horizon_core::Profile,
        horizon_core::Source,
        horizon_core::SourceType,
        horizon_core::Signal,
        horizon_core::SignalSummary,
        horizon_core::Horizon,
        horizon_core::Certainty,
        horizon_core::Impact,
        horizon_core::Trend,
        horizon_core::TrendSummary,
        horizon_core::TrendWithSignals,
        horizon_core::Megatrend,
        horizon_core::MegatrendWithTrends,
        horizon_core::Job,
        horizon_core::JobType,
        horizon_core::JobStatus,
        horizon_core::Analysis,
        horizon_core::ScrapedPage,
        horizon_core::SignalStub,
    ))
)]
struct ApiDoc;

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
pub fn api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(parse_allowed_origins())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Profiles
        .route("/api/profiles", post(profiles::create_profile))
        .route(
            "/api/profiles/me",
            get(profiles::get_me).patch(profiles::update_me),
        )
        .route("/api/profiles/:profile_id", get(profiles::get_profile))
        // Workspaces
        .route(
            "/api/workspaces",
            get(workspaces::list_workspaces).post(workspaces::create_workspace),
        )
        .route(
            "/api/workspaces/:workspace_id",
            get(workspaces::get_workspace)
                .patch(workspaces::update_workspace)
                .delete(workspaces::delete_workspace),
        )
        // Members
        .route(
            "/api/workspaces/:workspace_id/members",
            get(members::list_members).post(members::add_member),
        )
        .route(
            "/api/workspaces/:workspace_id/members/:user_id",
            patch(members::update_member_role).delete(members::remove_member),
        )
        // Sources
        .route(
            "/api/workspaces/:workspace_id/sources",
            get(sources::list_sources).post(sources::create_source),
        )
        .route(
            "/api/workspaces/:workspace_id/sources/:source_id",
            get(sources::get_source)
                .patch(sources::update_source)
                .delete(sources::delete_source),
        )
        // Signals
        .route(
            "/api/workspaces/:workspace_id/signals",
            get(signals::list_signals).post(signals::create_signal),
        )
        .route(
            "/api/workspaces/:workspace_id/signals/:signal_id",
            get(signals::get_signal)
                .patch(signals::update_signal)
                .delete(signals::delete_signal),
        )
        .route(
            "/api/workspaces/:workspace_id/signals/:signal_id/trends",
            get(signals::get_signal_trends),
        )
        // Trends
        .route(
            "/api/workspaces/:workspace_id/trends",
            get(trends::list_trends).post(trends::create_trend),
        )
        .route(
            "/api/workspaces/:workspace_id/trends/:trend_id",
            get(trends::get_trend)
                .patch(trends::update_trend)
                .delete(trends::delete_trend),
        )
        .route(
            "/api/workspaces/:workspace_id/trends/:trend_id/signals/:signal_id",
            put(trends::link_signal).delete(trends::unlink_signal),
        )
        // Megatrends
        .route(
            "/api/workspaces/:workspace_id/megatrends",
            get(megatrends::list_megatrends).post(megatrends::create_megatrend),
        )
        .route(
            "/api/workspaces/:workspace_id/megatrends/:megatrend_id",
            get(megatrends::get_megatrend)
                .patch(megatrends::update_megatrend)
                .delete(megatrends::delete_megatrend),
        )
        .route(
            "/api/workspaces/:workspace_id/megatrends/:megatrend_id/trends/:trend_id",
            put(megatrends::link_trend).delete(megatrends::unlink_trend),
        )
        // Jobs
        .route(
            "/api/workspaces/:workspace_id/jobs",
            get(jobs::list_jobs).post(jobs::queue_job),
        )
        .route(
            "/api/workspaces/:workspace_id/jobs/:job_id",
            get(jobs::get_job),
        )
        // Ingest (provider-backed, stateless)
        .route("/api/ingest/scrape", post(ingest::scrape))
        .route("/api/ingest/summarize", post(ingest::summarize))
        .route("/api/ingest/describe", post(ingest::describe))
        .with_state(state)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowed_origins_default_is_localhost() {
        std::env::remove_var("ALLOWED_ORIGINS");
        let origins = parse_allowed_origins();
        assert!(!origins.is_empty());
        assert!(origins
            .iter()
            .all(|o| o.to_str().unwrap().starts_with("http://localhost")));
    }

    #[test]
    fn test_request_id_is_v7() {
        let mut maker = MakeRequestUuidV7;
        let req = axum::http::Request::builder().body(()).unwrap();
        let id = maker.make_request_id(&req).unwrap();
        let parsed = Uuid::parse_str(id.header_value().to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
