//! Core data models for horizon.
//!
//! These types are shared across all horizon crates and represent the
//! domain entities: workspaces, members, collected signals, and the trends
//! and megatrends synthesized from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TENANCY TYPES
// =============================================================================

/// Subscription plan for a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(format!("Unknown plan: {}", s)),
        }
    }
}

/// Root tenant boundary. Every domain row belongs to exactly one workspace.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role of a member within a workspace.
///
/// Roles are totally ordered for authorization: owner > admin > member >
/// viewer. Owner and admin hold management rights, member holds content
/// rights, viewer is read-only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
    Viewer,
}

impl Role {
    /// Numeric rank for ordering comparisons (higher = more rights).
    pub fn rank(self) -> u8 {
        match self {
            Self::Owner => 3,
            Self::Admin => 2,
            Self::Member => 1,
            Self::Viewer => 0,
        }
    }

    /// True for roles with management rights (workspace settings, membership).
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// True for roles with content rights (sources, signals, trends, jobs).
    pub fn can_write(self) -> bool {
        self.rank() >= Self::Member.rank()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Association of an identity to a workspace with a role.
/// Unique per (workspace_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Member {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Member row joined with the member's profile, for listing.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MemberWithProfile {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One-to-one with an authenticated identity. Globally readable.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SOURCE TYPES
// =============================================================================

/// Kind of recurring ingestion origin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Domain,
    Rss,
    Alert,
    Manual,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain => write!(f, "domain"),
            Self::Rss => write!(f, "rss"),
            Self::Alert => write!(f, "alert"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "domain" => Ok(Self::Domain),
            "rss" => Ok(Self::Rss),
            "alert" => Ok(Self::Alert),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("Unknown source type: {}", s)),
        }
    }
}

/// A recurring ingestion origin. The crawler that would consume
/// `crawl_interval_minutes` is an external boundary; only the schema exists
/// here.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Source {
    pub id: Uuid,
    pub workspace_id: Uuid,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub url_or_term: String,
    pub active: bool,
    pub crawl_interval_minutes: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_crawled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// SIGNAL TYPES
// =============================================================================

/// Qualitative time-to-impact bucket, in years.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Horizon {
    #[serde(rename = "0_5")]
    ZeroToFive,
    #[default]
    #[serde(rename = "5_10")]
    FiveToTen,
    #[serde(rename = "10_plus")]
    TenPlus,
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroToFive => write!(f, "0_5"),
            Self::FiveToTen => write!(f, "5_10"),
            Self::TenPlus => write!(f, "10_plus"),
        }
    }
}

impl std::str::FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "0_5" => Ok(Self::ZeroToFive),
            "5_10" => Ok(Self::FiveToTen),
            "10_plus" => Ok(Self::TenPlus),
            _ => Err(format!("Unknown horizon: {}", s)),
        }
    }
}

/// Qualitative confidence bucket.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    Certain,
    #[default]
    Uncertain,
    Wildcard,
}

impl std::fmt::Display for Certainty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Certain => write!(f, "certain"),
            Self::Uncertain => write!(f, "uncertain"),
            Self::Wildcard => write!(f, "wildcard"),
        }
    }
}

impl std::str::FromStr for Certainty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "certain" => Ok(Self::Certain),
            "uncertain" => Ok(Self::Uncertain),
            "wildcard" => Ok(Self::Wildcard),
            _ => Err(format!("Unknown certainty: {}", s)),
        }
    }
}

/// The atomic unit of collected evidence: an article, note, or URL.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Signal {
    pub id: Uuid,
    pub workspace_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<Uuid>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub ai_tags: Vec<String>,
    /// Relevance score in [0, 100].
    pub relevance: i32,
    pub horizon: Horizon,
    pub certainty: Certainty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight signal view for embedding in trend responses and lists.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SignalSummary {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub relevance: i32,
    pub horizon: Horizon,
    pub certainty: Certainty,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// TREND TYPES
// =============================================================================

/// Qualitative impact bucket for a trend.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown impact: {}", s)),
        }
    }
}

/// A synthesized pattern grounded in zero or more signals.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Trend {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub impact: Impact,
    pub certainty: Certainty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight trend view for embedding in megatrend responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TrendSummary {
    pub id: Uuid,
    pub title: String,
    pub impact: Impact,
    pub certainty: Certainty,
    pub created_at: DateTime<Utc>,
}

/// A trend with its linked signals resolved.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TrendWithSignals {
    #[serde(flatten)]
    pub trend: Trend,
    pub signals: Vec<SignalSummary>,
}

/// A synthesized grouping of trends.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Megatrend {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A megatrend with its linked trends resolved.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MegatrendWithTrends {
    #[serde(flatten)]
    pub megatrend: Megatrend,
    pub trends: Vec<TrendSummary>,
}

// =============================================================================
// JOB TYPES
// =============================================================================

/// Type of background work a job row describes.
///
/// No executor exists in this repo; jobs are inert rows until an external
/// worker claims them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Scan,
    Reindex,
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Reindex => write!(f, "reindex"),
        }
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" => Ok(Self::Scan),
            "reindex" => Ok(Self::Reindex),
            _ => Err(format!("Unknown job type: {}", s)),
        }
    }
}

/// Status of a job row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Error,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "done" => Ok(Self::Done),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

/// A background work item.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Job {
    pub id: Uuid,
    pub workspace_id: Uuid,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// INGEST TYPES
// =============================================================================

/// Result of scraping a URL: cleaned main-body markdown plus the page title
/// when the provider extracted one.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScrapedPage {
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Result of analyzing collected text. Every field is bounded: the summary
/// is capped at 1200 chars, takeaways is exactly 3 entries, tags holds 2-6
/// lowercase-hyphenated entries, and relevance sits in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Analysis {
    pub summary: String,
    pub takeaways: Vec<String>,
    pub tags: Vec<String>,
    pub relevance: i32,
    pub horizon: Horizon,
    pub certainty: Certainty,
}

/// Signal stub handed to description generation.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SignalStub {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Owner.rank() > Role::Admin.rank());
        assert!(Role::Admin.rank() > Role::Member.rank());
        assert!(Role::Member.rank() > Role::Viewer.rank());
    }

    #[test]
    fn test_role_rights() {
        assert!(Role::Owner.can_manage());
        assert!(Role::Admin.can_manage());
        assert!(!Role::Member.can_manage());
        assert!(Role::Member.can_write());
        assert!(!Role::Viewer.can_write());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Member, Role::Viewer] {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_horizon_serde_literals() {
        assert_eq!(
            serde_json::to_string(&Horizon::ZeroToFive).unwrap(),
            "\"0_5\""
        );
        assert_eq!(
            serde_json::to_string(&Horizon::FiveToTen).unwrap(),
            "\"5_10\""
        );
        assert_eq!(
            serde_json::to_string(&Horizon::TenPlus).unwrap(),
            "\"10_plus\""
        );
        assert_eq!(
            serde_json::from_str::<Horizon>("\"10_plus\"").unwrap(),
            Horizon::TenPlus
        );
    }

    #[test]
    fn test_horizon_from_str_rejects_unknown() {
        assert!(Horizon::from_str("1_2").is_err());
    }

    #[test]
    fn test_certainty_default() {
        assert_eq!(Certainty::default(), Certainty::Uncertain);
    }

    #[test]
    fn test_horizon_default() {
        assert_eq!(Horizon::default(), Horizon::FiveToTen);
    }

    #[test]
    fn test_job_status_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Done,
            JobStatus::Error,
        ] {
            assert_eq!(JobStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn test_source_type_serde() {
        assert_eq!(serde_json::to_string(&SourceType::Rss).unwrap(), "\"rss\"");
    }
}
