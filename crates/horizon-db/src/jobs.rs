//! Job repository implementation.
//!
//! Jobs describe intended background work (scan, reindex). The status
//! machine pending → running → done/error is enforced here as plain data
//! operations; no worker or scheduler exists in this repo, so rows stay
//! pending until an external executor drives them.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    new_v7,
    policy::{self, Action},
    Error, Job, JobRepository, JobStatus, JobType, Result,
};

use crate::members::fetch_role;

/// PostgreSQL implementation of JobRepository.
#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, actor: Uuid, workspace_id: Uuid, job_id: Uuid) -> Result<Job> {
        let row = sqlx::query(
            r#"
            SELECT j.id, j.workspace_id, j.type, j.status, j.started_at, j.finished_at,
                   j.log, j.created_at
            FROM job j
            WHERE j.id = $1 AND j.workspace_id = $2
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = j.workspace_id AND m.user_id = $3
              )
            "#,
        )
        .bind(job_id)
        .bind(workspace_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => job_from_row(&r),
            None => Err(Error::NotFound("job".to_string())),
        }
    }

    /// Apply a guarded status transition; rejects out-of-order moves.
    async fn transition(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
        log: Option<&str>,
    ) -> Result<Job> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let job = self.fetch(actor, workspace_id, job_id).await?;
        if job.status != from {
            return Err(Error::InvalidInput(format!(
                "job is {}, expected {}",
                job.status, from
            )));
        }

        let now = Utc::now();
        let (started_at, finished_at) = match to {
            JobStatus::Running => (Some(now), None),
            JobStatus::Done | JobStatus::Error => (job.started_at, Some(now)),
            JobStatus::Pending => (None, None),
        };

        sqlx::query(
            "UPDATE job
             SET status = $3, started_at = $4, finished_at = $5, log = COALESCE($6, log)
             WHERE id = $1 AND workspace_id = $2",
        )
        .bind(job_id)
        .bind(workspace_id)
        .bind(to.to_string())
        .bind(started_at)
        .bind(finished_at)
        .bind(log)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch(actor, workspace_id, job_id).await
    }
}

fn job_from_row(r: &sqlx::postgres::PgRow) -> Result<Job> {
    Ok(Job {
        id: r.get("id"),
        workspace_id: r.get("workspace_id"),
        job_type: r
            .get::<String, _>("type")
            .parse::<JobType>()
            .map_err(Error::Internal)?,
        status: r
            .get::<String, _>("status")
            .parse::<JobStatus>()
            .map_err(Error::Internal)?,
        started_at: r.get("started_at"),
        finished_at: r.get("finished_at"),
        log: r.get("log"),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn queue(&self, actor: Uuid, workspace_id: Uuid, job_type: JobType) -> Result<Uuid> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let id = new_v7();
        sqlx::query(
            "INSERT INTO job (id, workspace_id, type, status, created_at)
             VALUES ($1, $2, $3, 'pending', $4)",
        )
        .bind(id)
        .bind(workspace_id)
        .bind(job_type.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn get(&self, actor: Uuid, workspace_id: Uuid, job_id: Uuid) -> Result<Job> {
        self.fetch(actor, workspace_id, job_id).await
    }

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Job>> {
        let rows = sqlx::query(
            r#"
            SELECT j.id, j.workspace_id, j.type, j.status, j.started_at, j.finished_at,
                   j.log, j.created_at
            FROM job j
            WHERE j.workspace_id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = j.workspace_id AND m.user_id = $2
              )
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(workspace_id)
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(job_from_row).collect()
    }

    async fn mark_running(&self, actor: Uuid, workspace_id: Uuid, job_id: Uuid) -> Result<Job> {
        self.transition(
            actor,
            workspace_id,
            job_id,
            JobStatus::Pending,
            JobStatus::Running,
            None,
        )
        .await
    }

    async fn mark_done(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        job_id: Uuid,
        log: Option<&str>,
    ) -> Result<Job> {
        self.transition(
            actor,
            workspace_id,
            job_id,
            JobStatus::Running,
            JobStatus::Done,
            log,
        )
        .await
    }

    async fn mark_error(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        job_id: Uuid,
        log: &str,
    ) -> Result<Job> {
        self.transition(
            actor,
            workspace_id,
            job_id,
            JobStatus::Running,
            JobStatus::Error,
            Some(log),
        )
        .await
    }
}
