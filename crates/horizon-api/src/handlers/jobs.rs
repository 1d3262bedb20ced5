//! Job handlers.
//!
//! Queue and inspect job rows. There is no executor behind these: a queued
//! job stays pending until an external worker drives the status machine.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use horizon_core::{JobRepository, JobType};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueueJobBody {
    #[serde(rename = "type")]
    pub job_type: JobType,
}

pub async fn queue_job(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<QueueJobBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .db
        .jobs
        .queue(profile.id, workspace_id, body.job_type)
        .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state.db.jobs.list(profile.id, workspace_id).await?;
    Ok(Json(jobs))
}

pub async fn get_job(
    State(state): State<AppState>,
    Identity(profile): Identity,
    Path((workspace_id, job_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.db.jobs.get(profile.id, workspace_id, job_id).await?;
    Ok(Json(job))
}
