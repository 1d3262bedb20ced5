//! # horizon-db
//!
//! PostgreSQL database layer for horizon.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all domain entities
//! - Membership-predicate scoping on every workspace query
//! - The atomic workspace + founding-owner creation transaction
//!
//! ## Example
//!
//! ```rust,ignore
//! use horizon_db::Database;
//! use horizon_core::{CreateWorkspaceRequest, WorkspaceRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/horizon").await?;
//!
//!     let workspace_id = db.workspaces.create(actor, CreateWorkspaceRequest {
//!         name: "Acme".to_string(),
//!         plan: None,
//!     }).await?;
//!
//!     println!("Created workspace: {}", workspace_id);
//!     Ok(())
//! }
//! ```

pub mod jobs;
pub mod members;
pub mod megatrends;
pub mod pool;
pub mod profiles;
pub mod signals;
pub mod sources;
pub mod trends;
pub mod workspaces;

// Re-export core types
pub use horizon_core::*;

// Re-export repository implementations
pub use jobs::PgJobRepository;
pub use members::PgMemberRepository;
pub use megatrends::PgMegatrendRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use profiles::PgProfileRepository;
pub use signals::PgSignalRepository;
pub use sources::PgSourceRepository;
pub use trends::PgTrendRepository;
pub use workspaces::PgWorkspaceRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Workspace lifecycle (including atomic create-with-owner).
    pub workspaces: PgWorkspaceRepository,
    /// Workspace membership relation.
    pub members: PgMemberRepository,
    /// Identity profiles and API keys.
    pub profiles: PgProfileRepository,
    /// Ingestion sources.
    pub sources: PgSourceRepository,
    /// Collected signals.
    pub signals: PgSignalRepository,
    /// Trends and the signal↔trend relation.
    pub trends: PgTrendRepository,
    /// Megatrends and the trend↔megatrend relation.
    pub megatrends: PgMegatrendRepository,
    /// Background job rows (no executor in this crate).
    pub jobs: PgJobRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            workspaces: PgWorkspaceRepository::new(pool.clone()),
            members: PgMemberRepository::new(pool.clone()),
            profiles: PgProfileRepository::new(pool.clone()),
            sources: PgSourceRepository::new(pool.clone()),
            signals: PgSignalRepository::new(pool.clone()),
            trends: PgTrendRepository::new(pool.clone()),
            megatrends: PgMegatrendRepository::new(pool.clone()),
            jobs: PgJobRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
