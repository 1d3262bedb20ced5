//! Source repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    new_v7,
    policy::{self, Action},
    CreateSourceRequest, Error, Result, Source, SourceRepository, SourceType,
    UpdateSourceRequest,
};

use crate::members::fetch_role;

/// PostgreSQL implementation of SourceRepository.
#[derive(Clone)]
pub struct PgSourceRepository {
    pool: PgPool,
}

impl PgSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn source_from_row(r: &sqlx::postgres::PgRow) -> Result<Source> {
    Ok(Source {
        id: r.get("id"),
        workspace_id: r.get("workspace_id"),
        source_type: r
            .get::<String, _>("type")
            .parse::<SourceType>()
            .map_err(Error::Internal)?,
        url_or_term: r.get("url_or_term"),
        active: r.get("active"),
        crawl_interval_minutes: r.get("crawl_interval_minutes"),
        last_crawled_at: r.get("last_crawled_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

const SOURCE_COLUMNS: &str = "s.id, s.workspace_id, s.type, s.url_or_term, s.active, \
                              s.crawl_interval_minutes, s.last_crawled_at, s.created_at, s.updated_at";

#[async_trait]
impl SourceRepository for PgSourceRepository {
    async fn create(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: CreateSourceRequest,
    ) -> Result<Uuid> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO source
                 (id, workspace_id, type, url_or_term, active, crawl_interval_minutes,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)",
        )
        .bind(id)
        .bind(workspace_id)
        .bind(req.source_type.to_string())
        .bind(req.url_or_term.trim())
        .bind(req.active.unwrap_or(true))
        .bind(req.crawl_interval_minutes.unwrap_or(1440))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn get(&self, actor: Uuid, workspace_id: Uuid, source_id: Uuid) -> Result<Source> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {SOURCE_COLUMNS}
            FROM source s
            WHERE s.id = $1 AND s.workspace_id = $2
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = s.workspace_id AND m.user_id = $3
              )
            "#
        ))
        .bind(source_id)
        .bind(workspace_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => source_from_row(&r),
            None => Err(Error::NotFound("source".to_string())),
        }
    }

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Source>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SOURCE_COLUMNS}
            FROM source s
            WHERE s.workspace_id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = s.workspace_id AND m.user_id = $2
              )
            ORDER BY s.created_at DESC
            "#
        ))
        .bind(workspace_id)
        .bind(actor)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(source_from_row).collect()
    }

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        source_id: Uuid,
        req: UpdateSourceRequest,
    ) -> Result<Source> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let result = sqlx::query(
            "UPDATE source
             SET url_or_term = COALESCE($3, url_or_term),
                 active = COALESCE($4, active),
                 crawl_interval_minutes = COALESCE($5, crawl_interval_minutes),
                 updated_at = $6
             WHERE id = $1 AND workspace_id = $2",
        )
        .bind(source_id)
        .bind(workspace_id)
        .bind(req.url_or_term.as_ref().map(|u| u.trim().to_string()))
        .bind(req.active)
        .bind(req.crawl_interval_minutes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("source".to_string()));
        }

        self.get(actor, workspace_id, source_id).await
    }

    async fn delete(&self, actor: Uuid, workspace_id: Uuid, source_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let result = sqlx::query("DELETE FROM source WHERE id = $1 AND workspace_id = $2")
            .bind(source_id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("source".to_string()));
        }
        Ok(())
    }

    async fn mark_crawled(&self, actor: Uuid, workspace_id: Uuid, source_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE source SET last_crawled_at = $3, updated_at = $3
             WHERE id = $1 AND workspace_id = $2",
        )
        .bind(source_id)
        .bind(workspace_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("source".to_string()));
        }
        Ok(())
    }
}
