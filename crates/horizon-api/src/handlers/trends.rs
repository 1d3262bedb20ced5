//! Trend handlers, including the signal↔trend link endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use horizon_core::{CreateTrendRequest, TrendRepository, UpdateTrendRequest};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_trend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateTrendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.db.trends.create(profile.id, workspace_id, body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn list_trends(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let trends = state.db.trends.list(profile.id, workspace_id).await?;
    Ok(Json(trends))
}

pub async fn get_trend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, trend_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let trend = state
        .db
        .trends
        .get(profile.id, workspace_id, trend_id)
        .await?;
    Ok(Json(trend))
}

pub async fn update_trend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, trend_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTrendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let trend = state
        .db
        .trends
        .update(profile.id, workspace_id, trend_id, body)
        .await?;
    Ok(Json(trend))
}

pub async fn delete_trend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, trend_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .trends
        .delete(profile.id, workspace_id, trend_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn link_signal(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, trend_id, signal_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .trends
        .link_signal(profile.id, workspace_id, trend_id, signal_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlink_signal(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, trend_id, signal_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .trends
        .unlink_signal(profile.id, workspace_id, trend_id, signal_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
