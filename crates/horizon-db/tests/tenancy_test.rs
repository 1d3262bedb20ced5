//! Live-database tests for the tenancy and authorization model.
//!
//! These run against a migrated PostgreSQL instance and are ignored by
//! default. Enable with:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/horizon_test cargo test -p horizon-db -- --ignored
//! ```

use uuid::Uuid;

use horizon_db::{
    AddMemberRequest, CreateProfileRequest, CreateSignalRequest, CreateSourceRequest,
    CreateTrendRequest, CreateWorkspaceRequest, Database, Error, JobRepository, JobStatus,
    JobType, ListSignalsRequest, MemberRepository, ProfileRepository, Role, SignalRepository,
    SourceRepository, SourceType, TrendRepository, WorkspaceRepository,
};

async fn connect() -> Database {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a migrated test database");
    Database::connect(&url).await.expect("connect test database")
}

async fn new_user(db: &Database) -> Uuid {
    let email = format!("user-{}@test.invalid", Uuid::new_v4());
    db.profiles
        .create(CreateProfileRequest {
            email,
            full_name: None,
        })
        .await
        .expect("create profile")
        .profile
        .id
}

fn signal_request(title: &str) -> CreateSignalRequest {
    CreateSignalRequest {
        source_id: None,
        title: title.to_string(),
        url: None,
        content: None,
        summary: None,
        ai_tags: None,
        relevance: None,
        horizon: None,
        certainty: None,
    }
}

#[tokio::test]
#[ignore]
async fn test_workspace_creation_installs_exactly_one_owner() {
    let db = connect().await;
    let alice = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();

    let members = db.members.list(alice, workspace_id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, alice);
    assert_eq!(members[0].role, Role::Owner);
}

#[tokio::test]
#[ignore]
async fn test_non_member_sees_zero_rows_not_an_error() {
    let db = connect().await;
    let alice = new_user(&db).await;
    let mallory = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();
    db.signals
        .create(alice, workspace_id, signal_request("Foo"))
        .await
        .unwrap();

    // Listing is empty, not an error: the membership predicate is composed
    // into the query itself.
    let listed = db
        .signals
        .list(mallory, workspace_id, ListSignalsRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 0);
    assert!(listed.signals.is_empty());

    // Point reads and writes read as absence, never as a permission error.
    let err = db.workspaces.get(mallory, workspace_id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    let err = db
        .signals
        .create(mallory, workspace_id, signal_request("Sneaky"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
#[ignore]
async fn test_viewer_reads_but_cannot_mutate() {
    let db = connect().await;
    let alice = new_user(&db).await;
    let vera = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();
    db.members
        .add(
            alice,
            workspace_id,
            AddMemberRequest {
                user_id: vera,
                role: Role::Viewer,
            },
        )
        .await
        .unwrap();
    let signal_id = db
        .signals
        .create(alice, workspace_id, signal_request("Foo"))
        .await
        .unwrap();

    // Viewer reads fine
    assert!(db.signals.get(vera, workspace_id, signal_id).await.is_ok());

    // Every mutation is rejected as Forbidden (existence already known)
    let err = db
        .signals
        .create(vera, workspace_id, signal_request("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
    let err = db
        .signals
        .delete(vera, workspace_id, signal_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
#[ignore]
async fn test_revoking_membership_revokes_visibility() {
    let db = connect().await;
    let alice = new_user(&db).await;
    let bob = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();
    db.members
        .add(
            alice,
            workspace_id,
            AddMemberRequest {
                user_id: bob,
                role: Role::Member,
            },
        )
        .await
        .unwrap();
    assert!(db.workspaces.get(bob, workspace_id).await.is_ok());

    db.members.remove(alice, workspace_id, bob).await.unwrap();
    let err = db.workspaces.get(bob, workspace_id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
#[ignore]
async fn test_last_owner_cannot_be_removed_or_demoted() {
    let db = connect().await;
    let alice = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Solo".into(),
                plan: None,
            },
        )
        .await
        .unwrap();

    let err = db
        .members
        .set_role(alice, workspace_id, alice, Role::Member)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = db.members.remove(alice, workspace_id, alice).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
#[ignore]
async fn test_link_lifecycle_and_join_cleanup_on_trend_delete() {
    let db = connect().await;
    let alice = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();
    let signal_id = db
        .signals
        .create(alice, workspace_id, signal_request("Foo"))
        .await
        .unwrap();
    let trend_id = db
        .trends
        .create(
            alice,
            workspace_id,
            CreateTrendRequest {
                title: "Distributed energy".into(),
                description: None,
                impact: None,
                certainty: None,
                owner_id: None,
            },
        )
        .await
        .unwrap();

    db.trends
        .link_signal(alice, workspace_id, trend_id, signal_id)
        .await
        .unwrap();

    // Both directions of the link resolve
    let trend = db.trends.get(alice, workspace_id, trend_id).await.unwrap();
    assert_eq!(trend.signals.len(), 1);
    assert_eq!(trend.signals[0].id, signal_id);
    let trends = db
        .signals
        .trends_for(alice, workspace_id, signal_id)
        .await
        .unwrap();
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].id, trend_id);

    // Deleting the trend clears the join rows
    db.trends.delete(alice, workspace_id, trend_id).await.unwrap();
    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM signal_trend WHERE trend_id = $1")
            .bind(trend_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
#[ignore]
async fn test_source_crawl_stamp() {
    let db = connect().await;
    let alice = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();
    let source_id = db
        .sources
        .create(
            alice,
            workspace_id,
            CreateSourceRequest {
                source_type: SourceType::Rss,
                url_or_term: "https://example.com/feed.xml".into(),
                active: None,
                crawl_interval_minutes: Some(60),
            },
        )
        .await
        .unwrap();

    let source = db.sources.get(alice, workspace_id, source_id).await.unwrap();
    assert!(source.last_crawled_at.is_none());

    db.sources
        .mark_crawled(alice, workspace_id, source_id)
        .await
        .unwrap();
    let source = db.sources.get(alice, workspace_id, source_id).await.unwrap();
    assert!(source.last_crawled_at.is_some());
}

#[tokio::test]
#[ignore]
async fn test_job_status_machine() {
    let db = connect().await;
    let alice = new_user(&db).await;

    let workspace_id = db
        .workspaces
        .create(
            alice,
            CreateWorkspaceRequest {
                name: "Acme".into(),
                plan: None,
            },
        )
        .await
        .unwrap();

    let job_id = db.jobs.queue(alice, workspace_id, JobType::Scan).await.unwrap();
    let job = db.jobs.get(alice, workspace_id, job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Pending);

    // done before running is rejected
    let err = db
        .jobs
        .mark_done(alice, workspace_id, job_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let job = db.jobs.mark_running(alice, workspace_id, job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Running);
    assert!(job.started_at.is_some());

    let job = db
        .jobs
        .mark_done(alice, workspace_id, job_id, Some("scanned 12 sources"))
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Done);
    assert!(job.finished_at.is_some());
}
