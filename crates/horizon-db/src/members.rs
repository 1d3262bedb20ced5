//! Member repository: the workspace membership relation.
//!
//! `fetch_role` is the single role-resolution point every repository in
//! this crate consults before mutating, and the EXISTS predicate built from
//! the same relation is composed into every workspace-scoped SELECT.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use horizon_core::{
    policy::{self, Action},
    AddMemberRequest, Error, MemberRepository, MemberWithProfile, Result, Role,
};

/// Resolve an actor's role in a workspace. `None` means no membership row.
pub(crate) async fn fetch_role(
    pool: &PgPool,
    actor: Uuid,
    workspace_id: Uuid,
) -> Result<Option<Role>> {
    let role = sqlx::query_scalar::<_, String>(
        "SELECT role FROM member WHERE workspace_id = $1 AND user_id = $2",
    )
    .bind(workspace_id)
    .bind(actor)
    .fetch_optional(pool)
    .await
    .map_err(Error::Database)?;

    role.map(|r| r.parse::<Role>().map_err(Error::Internal))
        .transpose()
}

/// PostgreSQL implementation of MemberRepository.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn owner_count(&self, workspace_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM member WHERE workspace_id = $1 AND role = 'owner'",
        )
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn role_of(&self, actor: Uuid, workspace_id: Uuid) -> Result<Option<Role>> {
        fetch_role(&self.pool, actor, workspace_id).await
    }

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<MemberWithProfile>> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Read)?;

        let rows = sqlx::query(
            r#"
            SELECT m.workspace_id, m.user_id, m.role, m.created_at,
                   p.email, p.full_name
            FROM member m
            JOIN profile p ON p.id = m.user_id
            WHERE m.workspace_id = $1
            ORDER BY m.created_at
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                Ok(MemberWithProfile {
                    workspace_id: r.get("workspace_id"),
                    user_id: r.get("user_id"),
                    role: r.get::<String, _>("role").parse().map_err(Error::Internal)?,
                    email: r.get("email"),
                    full_name: r.get("full_name"),
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }

    async fn add(&self, actor: Uuid, workspace_id: Uuid, req: AddMemberRequest) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Manage)?;

        sqlx::query(
            "INSERT INTO member (workspace_id, user_id, role, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(workspace_id)
        .bind(req.user_id)
        .bind(req.role.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn set_role(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        user_id: Uuid,
        new_role: Role,
    ) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Manage)?;

        let current = fetch_role(&self.pool, user_id, workspace_id)
            .await?
            .ok_or_else(|| Error::NotFound("member".to_string()))?;

        // A workspace must always retain at least one owner.
        if current == Role::Owner && new_role != Role::Owner && self.owner_count(workspace_id).await? <= 1
        {
            return Err(Error::InvalidInput(
                "workspace must retain at least one owner".into(),
            ));
        }

        sqlx::query("UPDATE member SET role = $1 WHERE workspace_id = $2 AND user_id = $3")
            .bind(new_role.to_string())
            .bind(workspace_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    async fn remove(&self, actor: Uuid, workspace_id: Uuid, user_id: Uuid) -> Result<()> {
        let role = fetch_role(&self.pool, actor, workspace_id).await?;
        policy::require(role, Action::Manage)?;

        let current = fetch_role(&self.pool, user_id, workspace_id)
            .await?
            .ok_or_else(|| Error::NotFound("member".to_string()))?;

        if current == Role::Owner && self.owner_count(workspace_id).await? <= 1 {
            return Err(Error::InvalidInput(
                "workspace must retain at least one owner".into(),
            ));
        }

        sqlx::query("DELETE FROM member WHERE workspace_id = $1 AND user_id = $2")
            .bind(workspace_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }
}
