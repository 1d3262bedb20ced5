//! Source handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use horizon_core::{CreateSourceRequest, SourceRepository, UpdateSourceRequest};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_source(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateSourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .db
        .sources
        .create(profile.id, workspace_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn list_sources(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sources = state.db.sources.list(profile.id, workspace_id).await?;
    Ok(Json(sources))
}

pub async fn get_source(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, source_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let source = state
        .db
        .sources
        .get(profile.id, workspace_id, source_id)
        .await?;
    Ok(Json(source))
}

pub async fn update_source(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, source_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateSourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let source = state
        .db
        .sources
        .update(profile.id, workspace_id, source_id, body)
        .await?;
    Ok(Json(source))
}

pub async fn delete_source(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, source_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .sources
        .delete(profile.id, workspace_id, source_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
