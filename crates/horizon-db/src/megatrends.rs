//! Megatrend repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    new_v7,
    policy::{self, Action},
    Certainty, CreateMegatrendRequest, Error, Impact, Megatrend, MegatrendRepository,
    MegatrendWithTrends, Result, TrendSummary, UpdateMegatrendRequest,
};

use crate::members::fetch_role;

/// PostgreSQL implementation of MegatrendRepository.
#[derive(Clone)]
pub struct PgMegatrendRepository {
    pool: PgPool,
}

impl PgMegatrendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_megatrend(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
    ) -> Result<Megatrend> {
        let row = sqlx::query(
            r#"
            SELECT g.id, g.workspace_id, g.title, g.description, g.created_at, g.updated_at
            FROM megatrend g
            WHERE g.id = $1 AND g.workspace_id = $2
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = g.workspace_id AND m.user_id = $3
              )
            "#,
        )
        .bind(megatrend_id)
        .bind(workspace_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| megatrend_from_row(&r))
            .ok_or_else(|| Error::NotFound("megatrend".to_string()))
    }

    async fn trend_exists(&self, workspace_id: Uuid, trend_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM trend WHERE id = $1 AND workspace_id = $2)",
        )
        .bind(trend_id)
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }
}

fn megatrend_from_row(r: &sqlx::postgres::PgRow) -> Megatrend {
    Megatrend {
        id: r.get("id"),
        workspace_id: r.get("workspace_id"),
        title: r.get("title"),
        description: r.get("description"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl MegatrendRepository for PgMegatrendRepository {
    async fn create(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: CreateMegatrendRequest,
    ) -> Result<Uuid> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO megatrend (id, workspace_id, title, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)",
        )
        .bind(id)
        .bind(workspace_id)
        .bind(req.title.trim())
        .bind(&req.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn get(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
    ) -> Result<MegatrendWithTrends> {
        let megatrend = self.fetch_megatrend(actor, workspace_id, megatrend_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT t.id, t.title, t.impact, t.certainty, t.created_at
            FROM trend t
            JOIN trend_megatrend tm ON tm.trend_id = t.id
            WHERE tm.megatrend_id = $1 AND t.workspace_id = $2
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(megatrend_id)
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let trends = rows
            .into_iter()
            .map(|r| {
                Ok(TrendSummary {
                    id: r.get("id"),
                    title: r.get("title"),
                    impact: r
                        .get::<String, _>("impact")
                        .parse::<Impact>()
                        .map_err(Error::Internal)?,
                    certainty: r
                        .get::<String, _>("certainty")
                        .parse::<Certainty>()
                        .map_err(Error::Internal)?,
                    created_at: r.get("created_at"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MegatrendWithTrends { megatrend, trends })
    }

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Megatrend>> {
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.workspace_id, g.title, g.description, g.created_at, g.updated_at
            FROM megatrend g
            WHERE g.workspace_id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = g.workspace_id AND m.user_id = $2
              )
            ORDER BY g.created_at DESC
            "#,
        )
        .bind(workspace_id)
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(megatrend_from_row).collect())
    }

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
        req: UpdateMegatrendRequest,
    ) -> Result<Megatrend> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let result = sqlx::query(
            "UPDATE megatrend
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 updated_at = $5
             WHERE id = $1 AND workspace_id = $2",
        )
        .bind(megatrend_id)
        .bind(workspace_id)
        .bind(req.title.as_ref().map(|t| t.trim().to_string()))
        .bind(&req.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("megatrend".to_string()));
        }

        self.fetch_megatrend(actor, workspace_id, megatrend_id).await
    }

    async fn delete(&self, actor: Uuid, workspace_id: Uuid, megatrend_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "DELETE FROM trend_megatrend tm
             USING megatrend g
             WHERE tm.megatrend_id = g.id AND g.id = $1 AND g.workspace_id = $2",
        )
        .bind(megatrend_id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM megatrend WHERE id = $1 AND workspace_id = $2")
            .bind(megatrend_id)
            .bind(workspace_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Err(Error::NotFound("megatrend".to_string()));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn link_trend(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
        trend_id: Uuid,
    ) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        self.fetch_megatrend(actor, workspace_id, megatrend_id).await?;
        if !self.trend_exists(workspace_id, trend_id).await? {
            return Err(Error::NotFound("trend".to_string()));
        }

        sqlx::query(
            "INSERT INTO trend_megatrend (trend_id, megatrend_id)
             VALUES ($1, $2)
             ON CONFLICT (trend_id, megatrend_id) DO NOTHING",
        )
        .bind(trend_id)
        .bind(megatrend_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn unlink_trend(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
        trend_id: Uuid,
    ) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        self.fetch_megatrend(actor, workspace_id, megatrend_id).await?;

        sqlx::query("DELETE FROM trend_megatrend WHERE trend_id = $1 AND megatrend_id = $2")
            .bind(trend_id)
            .bind(megatrend_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }
}
