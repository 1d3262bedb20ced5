//! Workspace handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use horizon_core::{CreateWorkspaceRequest, UpdateWorkspaceRequest, WorkspaceRepository};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_workspace(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Json(body): Json<CreateWorkspaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.db.workspaces.create(profile.id, body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn list_workspaces(
    State(state): State<AppState>,
    Identity(profile): Identity,
) -> Result<impl IntoResponse, ApiError> {
    let workspaces = state.db.workspaces.list_for_actor(profile.id).await?;
    Ok(Json(workspaces))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = state.db.workspaces.get(profile.id, workspace_id).await?;
    Ok(Json(workspace))
}

pub async fn update_workspace(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<UpdateWorkspaceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let workspace = state
        .db
        .workspaces
        .update(profile.id, workspace_id, body)
        .await?;
    Ok(Json(workspace))
}

pub async fn delete_workspace(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.workspaces.delete(profile.id, workspace_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
