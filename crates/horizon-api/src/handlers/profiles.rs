//! Profile handlers.
//!
//! `create_profile` stands in for the external identity provider: it
//! provisions a profile row and returns the API key exactly once. Profiles
//! are globally readable; only the owner mutates their own row.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use horizon_core::{CreateProfileRequest, ProfileRepository, UpdateProfileRequest};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.db.profiles.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_me(Identity(profile): Identity) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state.db.profiles.update_self(profile.id, body).await?;
    Ok(Json(updated))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Identity(_profile): Identity,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.db.profiles.get(profile_id).await?;
    Ok(Json(profile))
}
