//! Core traits for horizon abstractions.
//!
//! These traits define the repository interfaces the concrete Postgres
//! implementations satisfy. Every method takes the acting identity
//! explicitly; nothing reads the current user from ambient state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::*;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// =============================================================================
// WORKSPACE REPOSITORY
// =============================================================================

/// Request for creating a workspace.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub plan: Option<Plan>,
}

impl CreateWorkspaceRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("workspace name is required".into()));
        }
        Ok(())
    }
}

/// Request for updating a workspace.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub plan: Option<Plan>,
}

impl UpdateWorkspaceRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::InvalidInput("workspace name is required".into()));
            }
        }
        Ok(())
    }
}

/// Repository for workspace lifecycle.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Create a workspace and its founding owner member atomically.
    async fn create(&self, actor: Uuid, req: CreateWorkspaceRequest) -> Result<Uuid>;

    /// Fetch a workspace the actor is a member of.
    async fn get(&self, actor: Uuid, workspace_id: Uuid) -> Result<Workspace>;

    /// List workspaces the actor is a member of.
    async fn list_for_actor(&self, actor: Uuid) -> Result<Vec<Workspace>>;

    /// Update workspace settings (requires management rights).
    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: UpdateWorkspaceRequest,
    ) -> Result<Workspace>;

    /// Delete a workspace and everything it owns (requires management rights).
    async fn delete(&self, actor: Uuid, workspace_id: Uuid) -> Result<()>;
}

// =============================================================================
// MEMBER REPOSITORY
// =============================================================================

/// Request for adding a member to a workspace.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: Role,
}

/// Repository for the workspace membership relation.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Resolve the actor's role in a workspace. `None` means no membership
    /// row exists.
    async fn role_of(&self, actor: Uuid, workspace_id: Uuid) -> Result<Option<Role>>;

    /// List all members of a workspace (any member may read).
    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<MemberWithProfile>>;

    /// Add a member (requires management rights).
    async fn add(&self, actor: Uuid, workspace_id: Uuid, req: AddMemberRequest) -> Result<()>;

    /// Change a member's role (requires management rights; the last owner
    /// cannot be demoted).
    async fn set_role(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<()>;

    /// Remove a member (requires management rights; the last owner cannot
    /// be removed).
    async fn remove(&self, actor: Uuid, workspace_id: Uuid, user_id: Uuid) -> Result<()>;
}

// =============================================================================
// PROFILE REPOSITORY
// =============================================================================

/// Request for creating a profile (identity provisioning boundary).
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateProfileRequest {
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl CreateProfileRequest {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(Error::InvalidInput("email is required".into()));
        }
        Ok(())
    }
}

/// A freshly created profile with its one-time-visible API key.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CreatedProfile {
    pub profile: Profile,
    /// Shown once at creation; only the hash is stored.
    pub api_key: String,
}

/// Request for a profile updating itself.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Repository for profiles. Profiles are globally readable; only the
/// profile itself may mutate its row.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Profile>;

    /// Resolve a presented API key to its profile, or `None`.
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Profile>>;

    async fn create(&self, req: CreateProfileRequest) -> Result<CreatedProfile>;

    async fn update_self(&self, actor: Uuid, req: UpdateProfileRequest) -> Result<Profile>;
}

// =============================================================================
// SOURCE REPOSITORY
// =============================================================================

/// Request for creating a source.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateSourceRequest {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub url_or_term: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub crawl_interval_minutes: Option<i32>,
}

impl CreateSourceRequest {
    pub fn validate(&self) -> Result<()> {
        if self.url_or_term.trim().is_empty() {
            return Err(Error::InvalidInput("url_or_term is required".into()));
        }
        if let Some(interval) = self.crawl_interval_minutes {
            if interval <= 0 {
                return Err(Error::InvalidInput(
                    "crawl_interval_minutes must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Request for updating a source.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateSourceRequest {
    pub url_or_term: Option<String>,
    pub active: Option<bool>,
    pub crawl_interval_minutes: Option<i32>,
}

impl UpdateSourceRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(u) = &self.url_or_term {
            if u.trim().is_empty() {
                return Err(Error::InvalidInput("url_or_term is required".into()));
            }
        }
        if let Some(interval) = self.crawl_interval_minutes {
            if interval <= 0 {
                return Err(Error::InvalidInput(
                    "crawl_interval_minutes must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Repository for ingestion sources.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn create(&self, actor: Uuid, workspace_id: Uuid, req: CreateSourceRequest)
        -> Result<Uuid>;

    async fn get(&self, actor: Uuid, workspace_id: Uuid, source_id: Uuid) -> Result<Source>;

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Source>>;

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        source_id: Uuid,
        req: UpdateSourceRequest,
    ) -> Result<Source>;

    async fn delete(&self, actor: Uuid, workspace_id: Uuid, source_id: Uuid) -> Result<()>;

    /// Stamp a source as crawled now. Exists for the external crawler
    /// boundary; nothing in this repo calls it on a schedule.
    async fn mark_crawled(&self, actor: Uuid, workspace_id: Uuid, source_id: Uuid) -> Result<()>;
}

// =============================================================================
// SIGNAL REPOSITORY
// =============================================================================

/// Request for creating a signal.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateSignalRequest {
    #[serde(default)]
    pub source_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub ai_tags: Option<Vec<String>>,
    #[serde(default)]
    pub relevance: Option<i32>,
    #[serde(default)]
    pub horizon: Option<Horizon>,
    #[serde(default)]
    pub certainty: Option<Certainty>,
}

impl CreateSignalRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".into()));
        }
        if char_len(&self.title) > defaults::SIGNAL_TITLE_MAX {
            return Err(Error::InvalidInput(format!(
                "title exceeds {} characters",
                defaults::SIGNAL_TITLE_MAX
            )));
        }
        if let Some(summary) = &self.summary {
            if char_len(summary) > defaults::SUMMARY_MAX {
                return Err(Error::InvalidInput(format!(
                    "summary exceeds {} characters",
                    defaults::SUMMARY_MAX
                )));
            }
        }
        if let Some(relevance) = self.relevance {
            if !(0..=100).contains(&relevance) {
                return Err(Error::InvalidInput(
                    "relevance must be between 0 and 100".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Request for updating a signal.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateSignalRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub ai_tags: Option<Vec<String>>,
    pub relevance: Option<i32>,
    pub horizon: Option<Horizon>,
    pub certainty: Option<Certainty>,
}

impl UpdateSignalRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title is required".into()));
            }
            if char_len(title) > defaults::SIGNAL_TITLE_MAX {
                return Err(Error::InvalidInput(format!(
                    "title exceeds {} characters",
                    defaults::SIGNAL_TITLE_MAX
                )));
            }
        }
        if let Some(summary) = &self.summary {
            if char_len(summary) > defaults::SUMMARY_MAX {
                return Err(Error::InvalidInput(format!(
                    "summary exceeds {} characters",
                    defaults::SUMMARY_MAX
                )));
            }
        }
        if let Some(relevance) = self.relevance {
            if !(0..=100).contains(&relevance) {
                return Err(Error::InvalidInput(
                    "relevance must be between 0 and 100".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Request for listing signals.
#[derive(Debug, Clone, Default)]
pub struct ListSignalsRequest {
    pub horizon: Option<Horizon>,
    pub certainty: Option<Certainty>,
    pub source_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for listing signals.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ListSignalsResponse {
    pub signals: Vec<Signal>,
    pub total: i64,
}

/// Repository for signals.
#[async_trait]
pub trait SignalRepository: Send + Sync {
    async fn create(&self, actor: Uuid, workspace_id: Uuid, req: CreateSignalRequest)
        -> Result<Uuid>;

    async fn get(&self, actor: Uuid, workspace_id: Uuid, signal_id: Uuid) -> Result<Signal>;

    /// List signals with enum filters, newest first, offset/limit paged.
    async fn list(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: ListSignalsRequest,
    ) -> Result<ListSignalsResponse>;

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        signal_id: Uuid,
        req: UpdateSignalRequest,
    ) -> Result<Signal>;

    async fn delete(&self, actor: Uuid, workspace_id: Uuid, signal_id: Uuid) -> Result<()>;

    /// Trends a signal is linked to.
    async fn trends_for(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        signal_id: Uuid,
    ) -> Result<Vec<TrendSummary>>;
}

// =============================================================================
// TREND REPOSITORY
// =============================================================================

/// Request for creating a trend.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateTrendRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub certainty: Option<Certainty>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

impl CreateTrendRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".into()));
        }
        if char_len(&self.title) > defaults::TREND_TITLE_MAX {
            return Err(Error::InvalidInput(format!(
                "title exceeds {} characters",
                defaults::TREND_TITLE_MAX
            )));
        }
        if let Some(description) = &self.description {
            if char_len(description) > defaults::TREND_DESCRIPTION_MAX {
                return Err(Error::InvalidInput(format!(
                    "description exceeds {} characters",
                    defaults::TREND_DESCRIPTION_MAX
                )));
            }
        }
        Ok(())
    }
}

/// Request for updating a trend.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateTrendRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub impact: Option<Impact>,
    pub certainty: Option<Certainty>,
    pub owner_id: Option<Uuid>,
}

impl UpdateTrendRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title is required".into()));
            }
            if char_len(title) > defaults::TREND_TITLE_MAX {
                return Err(Error::InvalidInput(format!(
                    "title exceeds {} characters",
                    defaults::TREND_TITLE_MAX
                )));
            }
        }
        if let Some(description) = &self.description {
            if char_len(description) > defaults::TREND_DESCRIPTION_MAX {
                return Err(Error::InvalidInput(format!(
                    "description exceeds {} characters",
                    defaults::TREND_DESCRIPTION_MAX
                )));
            }
        }
        Ok(())
    }
}

/// Repository for trends and the signal↔trend relation.
#[async_trait]
pub trait TrendRepository: Send + Sync {
    async fn create(&self, actor: Uuid, workspace_id: Uuid, req: CreateTrendRequest)
        -> Result<Uuid>;

    /// Fetch a trend with its linked signal summaries.
    async fn get(&self, actor: Uuid, workspace_id: Uuid, trend_id: Uuid)
        -> Result<TrendWithSignals>;

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Trend>>;

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        trend_id: Uuid,
        req: UpdateTrendRequest,
    ) -> Result<Trend>;

    /// Delete a trend, clearing its join rows in the same transaction.
    async fn delete(&self, actor: Uuid, workspace_id: Uuid, trend_id: Uuid) -> Result<()>;

    async fn link_signal(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        trend_id: Uuid,
        signal_id: Uuid,
    ) -> Result<()>;

    async fn unlink_signal(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        trend_id: Uuid,
        signal_id: Uuid,
    ) -> Result<()>;
}

// =============================================================================
// MEGATREND REPOSITORY
// =============================================================================

/// Request for creating a megatrend.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateMegatrendRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateMegatrendRequest {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".into()));
        }
        if char_len(&self.title) > defaults::MEGATREND_TITLE_MAX {
            return Err(Error::InvalidInput(format!(
                "title exceeds {} characters",
                defaults::MEGATREND_TITLE_MAX
            )));
        }
        if let Some(description) = &self.description {
            if char_len(description) > defaults::MEGATREND_DESCRIPTION_MAX {
                return Err(Error::InvalidInput(format!(
                    "description exceeds {} characters",
                    defaults::MEGATREND_DESCRIPTION_MAX
                )));
            }
        }
        Ok(())
    }
}

/// Request for updating a megatrend.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateMegatrendRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateMegatrendRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title is required".into()));
            }
            if char_len(title) > defaults::MEGATREND_TITLE_MAX {
                return Err(Error::InvalidInput(format!(
                    "title exceeds {} characters",
                    defaults::MEGATREND_TITLE_MAX
                )));
            }
        }
        if let Some(description) = &self.description {
            if char_len(description) > defaults::MEGATREND_DESCRIPTION_MAX {
                return Err(Error::InvalidInput(format!(
                    "description exceeds {} characters",
                    defaults::MEGATREND_DESCRIPTION_MAX
                )));
            }
        }
        Ok(())
    }
}

/// Repository for megatrends and the trend↔megatrend relation.
#[async_trait]
pub trait MegatrendRepository: Send + Sync {
    async fn create(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        req: CreateMegatrendRequest,
    ) -> Result<Uuid>;

    /// Fetch a megatrend with its linked trend summaries.
    async fn get(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
    ) -> Result<MegatrendWithTrends>;

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Megatrend>>;

    async fn update(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
        req: UpdateMegatrendRequest,
    ) -> Result<Megatrend>;

    /// Delete a megatrend, clearing its join rows in the same transaction.
    async fn delete(&self, actor: Uuid, workspace_id: Uuid, megatrend_id: Uuid) -> Result<()>;

    async fn link_trend(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
        trend_id: Uuid,
    ) -> Result<()>;

    async fn unlink_trend(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        megatrend_id: Uuid,
        trend_id: Uuid,
    ) -> Result<()>;
}

// =============================================================================
// JOB REPOSITORY
// =============================================================================

/// Repository for job rows. Status transitions are plain data operations;
/// no executor lives in this repo.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn queue(&self, actor: Uuid, workspace_id: Uuid, job_type: JobType) -> Result<Uuid>;

    async fn get(&self, actor: Uuid, workspace_id: Uuid, job_id: Uuid) -> Result<Job>;

    async fn list(&self, actor: Uuid, workspace_id: Uuid) -> Result<Vec<Job>>;

    /// pending → running, stamping started_at.
    async fn mark_running(&self, actor: Uuid, workspace_id: Uuid, job_id: Uuid) -> Result<Job>;

    /// running → done, stamping finished_at.
    async fn mark_done(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        job_id: Uuid,
        log: Option<&str>,
    ) -> Result<Job>;

    /// running → error, stamping finished_at and recording the log.
    async fn mark_error(
        &self,
        actor: Uuid,
        workspace_id: Uuid,
        job_id: Uuid,
        log: &str,
    ) -> Result<Job>;
}

// =============================================================================
// ANALYSIS BACKEND
// =============================================================================

/// Backend for LLM text analysis. Implementations are stateless and safe to
/// retry; persistence is always a separate, explicit step by the caller.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Summarize and classify collected text. Inputs under 100 characters
    /// are rejected with [`Error::ContentTooShort`] before any request.
    async fn analyze(
        &self,
        content: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<Analysis>;

    /// Generate a trend description (≤1800 chars) from its linked signals.
    async fn describe(&self, title: &str, signals: &[SignalStub]) -> Result<String>;

    /// Model identifier used by this backend.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_workspace_rejects_empty_name() {
        let req = CreateWorkspaceRequest {
            name: "   ".into(),
            plan: None,
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("name is required"));
    }

    #[test]
    fn test_create_signal_rejects_long_title() {
        let req = CreateSignalRequest {
            source_id: None,
            title: "x".repeat(181),
            url: None,
            content: None,
            summary: None,
            ai_tags: None,
            relevance: None,
            horizon: None,
            certainty: None,
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds 180 characters"));
    }

    #[test]
    fn test_create_signal_title_cap_counts_chars_not_bytes() {
        // 180 multibyte chars must pass even though the byte length is larger
        let req = CreateSignalRequest {
            source_id: None,
            title: "é".repeat(180),
            url: None,
            content: None,
            summary: None,
            ai_tags: None,
            relevance: None,
            horizon: None,
            certainty: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_signal_rejects_out_of_range_relevance() {
        let req = CreateSignalRequest {
            source_id: None,
            title: "Foo".into(),
            url: None,
            content: None,
            summary: None,
            ai_tags: None,
            relevance: Some(101),
            horizon: None,
            certainty: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_trend_rejects_long_description() {
        let req = CreateTrendRequest {
            title: "Distributed energy".into(),
            description: Some("y".repeat(1801)),
            impact: None,
            certainty: None,
            owner_id: None,
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds 1800 characters"));
    }

    #[test]
    fn test_update_trend_allows_partial() {
        let req = UpdateTrendRequest {
            impact: Some(Impact::High),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_megatrend_description_cap_is_1200() {
        let ok = CreateMegatrendRequest {
            title: "Demographic shift".into(),
            description: Some("z".repeat(1200)),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateMegatrendRequest {
            title: "Demographic shift".into(),
            description: Some("z".repeat(1201)),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_create_source_rejects_zero_interval() {
        let req = CreateSourceRequest {
            source_type: SourceType::Rss,
            url_or_term: "https://example.com/feed.xml".into(),
            active: None,
            crawl_interval_minutes: Some(0),
        };
        assert!(req.validate().is_err());
    }
}
