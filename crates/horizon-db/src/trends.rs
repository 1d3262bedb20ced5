//! Trend repository implementation.
//!
//! Deleting a trend clears its signal_trend and trend_megatrend rows in the
//! same transaction before removing the trend itself, so no orphaned join
//! rows survive.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    new_v7,
    policy::{self, Action},
    Certainty, CreateTrendRequest, Error, Horizon, Impact, Result, SignalSummary, Trend,
    TrendRepository, TrendWithSignals, UpdateTrendRequest,
};

use crate::members::fetch_role;

/// PostgreSQL implementation of TrendRepository.
#[derive(Clone)]
pub struct PgTrendRepository {
    pool: PgPool,
}

impl PgTrendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the bare trend row, scoped by workspace and membership.
    async fn fetch_trend(&self, actor: Uuid, workspace_id: Uuid, trend_id: Uuid) -> Result<Trend> {
        let row = sqlx::query(
            r#"
            SELECT t.id, t.workspace_id, t.title, t.description, t.impact, t.certainty,
                   t.owner_id, t.created_at, t.updated_at
            FROM trend t
            WHERE t.id = $1 AND t.workspace_id = $2
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = t.workspace_id AND m.user_id = $3
              )
            "#,
        )
        .bind(trend_id)
        .bind(workspace_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => trend_from_row(&r),
            None => Err(Error::NotFound("trend".to_string())),
        }
    }

    /// Confirm a signal exists in the workspace (visibility already implied
    /// by the caller's role check).
    async fn signal_exists(&self, workspace_id: Uuid, signal_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM signal WHERE id = $1 AND workspace_id = $2)",
        )
        .bind(signal_id)
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }
}

fn trend_from_row(r: &sqlx::postgres::PgRow) -> Result<Trend> {
    Ok(Trend {
        id: r.get("id"),
        workspace_id: r.get("workspace_id"),
        title: r.get("title"),
        description: r.get("description"),
        impact: r
            .get::<String, _>("impact")
            .parse::<Impact>()
            .map_err(Error::Internal)?,
        certainty: r
            .get::<String, _>("certainty")
            .parse::<Certainty>()
            .map_err(Error::Internal)?,
        owner_id: r.get("owner_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl TrendRepository for PgTrendRepository {
    async fn create(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: CreateTrendRequest,
    ) -> Result<Uuid> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO trend
                 (id, workspace_id, title, description, impact, certainty, owner_id,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)",
        )
        .bind(id)
        .bind(workspace_id)
        .bind(req.title.trim())
        .bind(&req.description)
        .bind(req.impact.unwrap_or_default().to_string())
        .bind(req.certainty.unwrap_or_default().to_string())
        .bind(req.owner_id)
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
        trend_id: Uuid,
    ) -> Result<TrendWithSignals> {
        let trend = self.fetch_trend(actor, workspace_id, trend_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.title, s.url, s.summary, s.relevance, s.horizon, s.certainty,
                   s.created_at
            FROM signal s
            JOIN signal_trend st ON st.signal_id = s.id
            WHERE st.trend_id = $1 AND s.workspace_id = $2
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(trend_id)
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let signals = rows
            .into_iter()
            .map(|r| {
                Ok(SignalSummary {
                    id: r.get("id"),
                    title: r.get("title"),
                    url: r.get("url"),
                    summary: r.get("summary"),
                    relevance: r.get("relevance"),
                    horizon: r
                        .get::<String, _>("horizon")
                        .parse::<Horizon>()
                        .map_err(Error::Internal)?,
                    certainty: r
                        .get::<String, _>("certainty")
                        .parse::<Certainty>()
                        .map_err(Error::Internal)?,
                    created_at: r.get("created_at"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TrendWithSignals { trend, signals })
    }

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Trend>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.workspace_id, t.title, t.description, t.impact, t.certainty,
                   t.owner_id, t.created_at, t.updated_at
            FROM trend t
            WHERE t.workspace_id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = t.workspace_id AND m.user_id = $2
              )
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(workspace_id)
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(trend_from_row).collect()
    }

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        trend_id: Uuid,
        req: UpdateTrendRequest,
    ) -> Result<Trend> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let result = sqlx::query(
            "UPDATE trend
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 impact = COALESCE($5, impact),
                 certainty = COALESCE($6, certainty),
                 owner_id = COALESCE($7, owner_id),
                 updated_at = $8
             WHERE id = $1 AND workspace_id = $2",
        )
        .bind(trend_id)
        .bind(workspace_id)
        .bind(req.title.as_ref().map(|t| t.trim().to_string()))
        .bind(&req.description)
        .bind(req.impact.map(|i| i.to_string()))
        .bind(req.certainty.map(|c| c.to_string()))
        .bind(req.owner_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("trend".to_string()));
        }

        self.fetch_trend(actor, workspace_id, trend_id).await
    }

    async fn delete(&self, actor: Uuid, workspace_id: Uuid, trend_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Clear join rows first; the trend delete below is scoped, so a
        // trend in another workspace leaves everything untouched.
        sqlx::query(
            "DELETE FROM signal_trend st
             USING trend t
             WHERE st.trend_id = t.id AND t.id = $1 AND t.workspace_id = $2",
        )
        .bind(trend_id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        sqlx::query(
            "DELETE FROM trend_megatrend tm
             USING trend t
             WHERE tm.trend_id = t.id AND t.id = $1 AND t.workspace_id = $2",
        )
        .bind(trend_id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM trend WHERE id = $1 AND workspace_id = $2")
            .bind(trend_id)
            .bind(workspace_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(Error::Database)?;
            return Err(Error::NotFound("trend".to_string()));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn link_signal(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        trend_id: Uuid,
        signal_id: Uuid,
    ) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        self.fetch_trend(actor, workspace_id, trend_id).await?;
        if !self.signal_exists(workspace_id, signal_id).await? {
            return Err(Error::NotFound("signal".to_string()));
        }

        // Idempotent: re-linking an existing pair is a no-op.
        sqlx::query(
            "INSERT INTO signal_trend (signal_id, trend_id)
             VALUES ($1, $2)
             ON CONFLICT (signal_id, trend_id) DO NOTHING",
        )
        .bind(signal_id)
        .bind(trend_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn unlink_signal(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        trend_id: Uuid,
        signal_id: Uuid,
    ) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        self.fetch_trend(actor, workspace_id, trend_id).await?;

        sqlx::query("DELETE FROM signal_trend WHERE signal_id = $1 AND trend_id = $2")
            .bind(signal_id)
            .bind(trend_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }
}
