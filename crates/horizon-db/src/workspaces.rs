//! Workspace repository implementation.
//!
//! Workspace creation is the one multi-row invariant in the tenancy model:
//! the workspace row and its founding owner member are inserted in a single
//! transaction, so no workspace ever exists without an owner.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use horizon_core::{
    new_v7,
    policy::{self, Action},
    CreateWorkspaceRequest, Error, Plan, Result, UpdateWorkspaceRequest, Workspace,
    WorkspaceRepository,
};

use crate::members::fetch_role;

/// PostgreSQL implementation of WorkspaceRepository.
#[derive(Clone)]
pub struct PgWorkspaceRepository {
    pool: PgPool,
}

impl PgWorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn workspace_from_row(r: &sqlx::postgres::PgRow) -> Result<Workspace> {
    Ok(Workspace {
        id: r.get("id"),
        name: r.get("name"),
        plan: r.get::<String, _>("plan").parse::<Plan>().map_err(Error::Internal)?,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl WorkspaceRepository for PgWorkspaceRepository {
    async fn create(&self, actor: Uuid, req: CreateWorkspaceRequest) -> Result<Uuid> {
        req.validate()?;

        let id = new_v7();
        let now = Utc::now();
        let plan = req.plan.unwrap_or_default();

        // Both inserts or neither: a workspace without an owner must never
        // persist.
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO workspace (id, name, plan, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)",
        )
        .bind(id)
        .bind(req.name.trim())
        .bind(plan.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO member (workspace_id, user_id, role, created_at)
             VALUES ($1, $2, 'owner', $3)",
        )
        .bind(id)
        .bind(actor)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "workspaces",
            op = "create",
            workspace_id = %id,
            actor_id = %actor,
            "Workspace created with founding owner"
        );
        Ok(id)
    }

    async fn get(&self, actor: Uuid, workspace_id: Uuid) -> Result<Workspace> {
        let row = sqlx::query(
            r#"
            SELECT w.id, w.name, w.plan, w.created_at, w.updated_at
            FROM workspace w
            WHERE w.id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = w.id AND m.user_id = $2
              )
            "#,
        )
        .bind(workspace_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => workspace_from_row(&r),
            None => Err(Error::NotFound("workspace".to_string())),
        }
    }

    async fn list_for_actor(&self, actor: Uuid) -> Result<Vec<Workspace>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.name, w.plan, w.created_at, w.updated_at
            FROM workspace w
            JOIN member m ON m.workspace_id = w.id
            WHERE m.user_id = $1
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(workspace_from_row).collect()
    }

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: UpdateWorkspaceRequest,
    ) -> Result<Workspace> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Manage)?;

        sqlx::query(
            "UPDATE workspace
             SET name = COALESCE($2, name),
                 plan = COALESCE($3, plan),
                 updated_at = $4
             WHERE id = $1",
        )
        .bind(workspace_id)
        .bind(req.name.as_ref().map(|n| n.trim().to_string()))
        .bind(req.plan.map(|p| p.to_string()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.get(actor, workspace_id).await
    }

    async fn delete(&self, actor: Uuid, workspace_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Manage)?;

        // Cascades clear every workspace-owned row.
        sqlx::query("DELETE FROM workspace WHERE id = $1")
            .bind(workspace_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "workspaces",
            op = "delete",
            workspace_id = %workspace_id,
            actor_id = %actor,
            "Workspace deleted"
        );
        Ok(())
    }
}
