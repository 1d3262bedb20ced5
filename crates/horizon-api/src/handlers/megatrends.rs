//! Megatrend handlers, including the trend↔megatrend link endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use horizon_core::{CreateMegatrendRequest, MegatrendRepository, UpdateMegatrendRequest};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_megatrend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateMegatrendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .db
        .megatrends
        .create(profile.id, workspace_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn list_megatrends(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let megatrends = state.db.megatrends.list(profile.id, workspace_id).await?;
    Ok(Json(megatrends))
}

pub async fn get_megatrend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, megatrend_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let megatrend = state
        .db
        .megatrends
        .get(profile.id, workspace_id, megatrend_id)
        .await?;
    Ok(Json(megatrend))
}

pub async fn update_megatrend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, megatrend_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateMegatrendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let megatrend = state
        .db
        .megatrends
        .update(profile.id, workspace_id, megatrend_id, body)
        .await?;
    Ok(Json(megatrend))
}

pub async fn delete_megatrend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, megatrend_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .megatrends
        .delete(profile.id, workspace_id, megatrend_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn link_trend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, megatrend_id, trend_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .megatrends
        .link_trend(profile.id, workspace_id, megatrend_id, trend_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlink_trend(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, megatrend_id, trend_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .megatrends
        .unlink_trend(profile.id, workspace_id, megatrend_id, trend_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
