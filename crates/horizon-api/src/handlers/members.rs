//! Membership handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use horizon_core::{AddMemberRequest, MemberRepository, Role};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_members(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let members = state.db.members.list(profile.id, workspace_id).await?;
    Ok(Json(members))
}

pub async fn add_member(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.members.add(profile.id, workspace_id, body).await?;
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleBody {
    pub role: Role,
}

pub async fn update_member_role(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateMemberRoleBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .members
        .set_role(profile.id, workspace_id, user_id, body.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_member(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .members
        .remove(profile.id, workspace_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
