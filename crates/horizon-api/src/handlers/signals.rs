//! Signal handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use horizon_core::{
    Certainty, CreateSignalRequest, Horizon, ListSignalsRequest, SignalRepository,
    UpdateSignalRequest,
};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::response::ListResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListSignalsQuery {
    pub horizon: Option<Horizon>,
    pub certainty: Option<Certainty>,
    pub source_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_signals(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<ListSignalsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(limit) = query.limit {
        if limit <= 0 {
            return Err(ApiError::BadRequest("limit must be >= 1".into()));
        }
    }

    let req = ListSignalsRequest {
        horizon: query.horizon,
        certainty: query.certainty,
        source_id: query.source_id,
        limit: query.limit,
        offset: query.offset,
    };
    let limit = req.limit.unwrap_or(horizon_core::defaults::DEFAULT_PAGE_SIZE);
    let offset = req.offset.unwrap_or(0).max(0);

    let response = state.db.signals.list(profile.id, workspace_id, req).await?;
    Ok(Json(ListResponse::new(
        response.signals,
        response.total as usize,
        limit as usize,
        offset as usize,
    )))
}

pub async fn create_signal(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateSignalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .db
        .signals
        .create(profile.id, workspace_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn get_signal(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, signal_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let signal = state
        .db
        .signals
        .get(profile.id, workspace_id, signal_id)
        .await?;
    Ok(Json(signal))
}

pub async fn update_signal(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, signal_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateSignalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signal = state
        .db
        .signals
        .update(profile.id, workspace_id, signal_id, body)
        .await?;
    Ok(Json(signal))
}

pub async fn delete_signal(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, signal_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .signals
        .delete(profile.id, workspace_id, signal_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_signal_trends(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, signal_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let trends = state
        .db
        .signals
        .trends_for(profile.id, workspace_id, signal_id)
        .await?;
    Ok(Json(trends))
}
