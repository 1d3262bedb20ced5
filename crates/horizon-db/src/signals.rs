//! Signal repository implementation.
//!
//! Listing filters on the enum axes (horizon, certainty) plus source, pages
//! by offset/limit, and always orders newest first. The membership EXISTS
//! predicate rides along in every statement so a non-member sees zero rows
//! rather than an error.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    defaults, new_v7,
    policy::{self, Action},
    Certainty, CreateSignalRequest, Error, Horizon, ListSignalsRequest, ListSignalsResponse,
    Result, Signal, SignalRepository, TrendSummary, UpdateSignalRequest,
};

use crate::members::fetch_role;

/// PostgreSQL implementation of SignalRepository.
#[derive(Clone)]
pub struct PgSignalRepository {
    pool: PgPool,
}

impl PgSignalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn signal_from_row(r: &sqlx::postgres::PgRow) -> Result<Signal> {
    Ok(Signal {
        id: r.get("id"),
        workspace_id: r.get("workspace_id"),
        source_id: r.get("source_id"),
        title: r.get("title"),
        url: r.get("url"),
        content: r.get("content"),
        summary: r.get("summary"),
        ai_tags: r.get("ai_tags"),
        relevance: r.get("relevance"),
        horizon: r
            .get::<String, _>("horizon")
            .parse::<Horizon>()
            .map_err(Error::Internal)?,
        certainty: r
            .get::<String, _>("certainty")
            .parse::<Certainty>()
            .map_err(Error::Internal)?,
        created_by: r.get("created_by"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

const SIGNAL_COLUMNS: &str = "s.id, s.workspace_id, s.source_id, s.title, s.url, s.content, \
                              s.summary, s.ai_tags, s.relevance, s.horizon, s.certainty, \
                              s.created_by, s.created_at, s.updated_at";

/// Clamp caller-supplied paging to sane bounds.
pub(crate) fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .unwrap_or(defaults::DEFAULT_PAGE_SIZE)
        .clamp(1, defaults::MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[async_trait]
impl SignalRepository for PgSignalRepository {
    async fn create(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: CreateSignalRequest,
    ) -> Result<Uuid> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let id = new_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO signal
                 (id, workspace_id, source_id, title, url, content, summary, ai_tags,
                  relevance, horizon, certainty, created_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)",
        )
        .bind(id)
        .bind(workspace_id)
        .bind(req.source_id)
        .bind(req.title.trim())
        .bind(&req.url)
        .bind(&req.content)
        .bind(&req.summary)
        .bind(req.ai_tags.unwrap_or_default())
        .bind(req.relevance.unwrap_or(defaults::RELEVANCE_DEFAULT))
        .bind(req.horizon.unwrap_or_default().to_string())
        .bind(req.certainty.unwrap_or_default().to_string())
        .bind(actor)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn get(&self, actor: Uuid, workspace_id: Uuid, signal_id: Uuid) -> Result<Signal> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {SIGNAL_COLUMNS}
            FROM signal s
            WHERE s.id = $1 AND s.workspace_id = $2
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = s.workspace_id AND m.user_id = $3
              )
            "#
        ))
        .bind(signal_id)
        .bind(workspace_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => signal_from_row(&r),
            None => Err(Error::NotFound("signal".to_string())),
        }
    }

    async fn list(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: ListSignalsRequest,
    ) -> Result<ListSignalsResponse> {
        let (limit, offset) = clamp_page(req.limit, req.offset);
        let horizon = req.horizon.map(|h| h.to_string());
        let certainty = req.certainty.map(|c| c.to_string());

        let rows = sqlx::query(&format!(
            r#"
            SELECT {SIGNAL_COLUMNS}
            FROM signal s
            WHERE s.workspace_id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = s.workspace_id AND m.user_id = $2
              )
              AND ($3::text IS NULL OR s.horizon = $3)
              AND ($4::text IS NULL OR s.certainty = $4)
              AND ($5::uuid IS NULL OR s.source_id = $5)
            ORDER BY s.created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(workspace_id)
        .bind(actor)
        .bind(&horizon)
        .bind(&certainty)
        .bind(req.source_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM signal s
            WHERE s.workspace_id = $1
              AND EXISTS (
                  SELECT 1 FROM member m
                  WHERE m.workspace_id = s.workspace_id AND m.user_id = $2
              )
              AND ($3::text IS NULL OR s.horizon = $3)
              AND ($4::text IS NULL OR s.certainty = $4)
              AND ($5::uuid IS NULL OR s.source_id = $5)
            "#,
        )
        .bind(workspace_id)
        .bind(actor)
        .bind(&horizon)
        .bind(&certainty)
        .bind(req.source_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let signals = rows
            .iter()
            .map(signal_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(ListSignalsResponse { signals, total })
    }

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        signal_id: Uuid,
        req: UpdateSignalRequest,
    ) -> Result<Signal> {
        req.validate()?;
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        let result = sqlx::query(
            "UPDATE signal
             SET title = COALESCE($3, title),
                 url = COALESCE($4, url),
                 content = COALESCE($5, content),
                 summary = COALESCE($6, summary),
                 ai_tags = COALESCE($7, ai_tags),
                 relevance = COALESCE($8, relevance),
                 horizon = COALESCE($9, horizon),
                 certainty = COALESCE($10, certainty),
                 updated_at = $11
             WHERE id = $1 AND workspace_id = $2",
        )
        .bind(signal_id)
        .bind(workspace_id)
        .bind(req.title.as_ref().map(|t| t.trim().to_string()))
        .bind(&req.url)
        .bind(&req.content)
        .bind(&req.summary)
        .bind(&req.ai_tags)
        .bind(req.relevance)
        .bind(req.horizon.map(|h| h.to_string()))
        .bind(req.certainty.map(|c| c.to_string()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("signal".to_string()));
        }

        self.get(actor, workspace_id, signal_id).await
    }

    async fn delete(&self, actor: Uuid, workspace_id: Uuid, signal_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Write)?;

        // signal_trend rows cascade from the signal side.
        let result = sqlx::query("DELETE FROM signal WHERE id = $1 AND workspace_id = $2")
            .bind(signal_id)
            .bind(workspace_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("signal".to_string()));
        }
        Ok(())
    }

    async fn trends_for(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        signal_id: Uuid,
    ) -> Result<Vec<TrendSummary>> {
        // Confirm the signal is visible first so a bad ID reads as absence.
        self.get(actor, workspace_id, signal_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT t.id, t.title, t.impact, t.certainty, t.created_at
            FROM trend t
            JOIN signal_trend st ON st.trend_id = t.id
            WHERE st.signal_id = $1 AND t.workspace_id = $2
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(signal_id)
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                Ok(TrendSummary {
                    id: r.get("id"),
                    title: r.get("title"),
                    impact: r.get::<String, _>("impact").parse().map_err(Error::Internal)?,
                    certainty: r
                        .get::<String, _>("certainty")
                        .parse()
                        .map_err(Error::Internal)?,
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_defaults() {
        assert_eq!(clamp_page(None, None), (defaults::DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn test_clamp_page_caps_limit() {
        assert_eq!(clamp_page(Some(10_000), None).0, defaults::MAX_PAGE_SIZE);
        assert_eq!(clamp_page(Some(0), None).0, 1);
        assert_eq!(clamp_page(Some(-5), None).0, 1);
    }

    #[test]
    fn test_clamp_page_floors_offset() {
        assert_eq!(clamp_page(None, Some(-20)).1, 0);
        assert_eq!(clamp_page(None, Some(150)).1, 150);
    }
}
