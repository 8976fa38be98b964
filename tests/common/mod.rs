#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use clicktrail::config::Config;
use clicktrail::domain::entities::NewVisit;
use clicktrail::domain::repositories::VisitRepository;
use clicktrail::infrastructure::persistence::{PoolSettings, SqliteVisitRepository, connect};
use clicktrail::state::AppState;

/// A migrated database living in its own temporary directory.
///
/// The directory is removed when the value is dropped, so keep it alive for
/// the whole test.
pub struct TestDb {
    pub pool: Arc<SqlitePool>,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("test.db").display());

    let settings = PoolSettings {
        max_connections: 8,
        busy_timeout: Duration::from_secs(30),
        acquire_timeout: Duration::from_secs(30),
    };

    let pool = connect(&url, &settings).await.unwrap();

    TestDb {
        pool: Arc::new(pool),
        _dir: dir,
    }
}

pub fn test_state(db: &TestDb) -> AppState {
    let config = Config {
        ip_hash_salt: "test-salt".to_string(),
        ..Config::default()
    };
    AppState::new(db.pool.as_ref().clone(), &config)
}

pub async fn create_test_link(pool: &SqlitePool, code: &str, url: &str) -> i64 {
    create_tagged_link(pool, code, url, "", &[]).await
}

pub async fn create_tagged_link(
    pool: &SqlitePool,
    code: &str,
    url: &str,
    title: &str,
    tags: &[&str],
) -> i64 {
    let tags = serde_json::to_string(tags).unwrap();

    sqlx::query_scalar(
        r#"
        INSERT INTO links (original_url, short_code, title, tags, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING id
        "#,
    )
    .bind(url)
    .bind(code)
    .bind(title)
    .bind(tags)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn soft_delete_link(pool: &SqlitePool, link_id: i64) {
    sqlx::query("UPDATE links SET deleted_at = ?1 WHERE id = ?2")
        .bind(Utc::now())
        .bind(link_id)
        .execute(pool)
        .await
        .unwrap();
}

/// Records `count` visits through the transactional path so the counter
/// stays in step with the log.
pub async fn record_visits(
    pool: &Arc<SqlitePool>,
    link_id: i64,
    referrer: &str,
    at: DateTime<Utc>,
    count: usize,
) {
    let repo = SqliteVisitRepository::new(pool.clone());
    for _ in 0..count {
        repo.record(NewVisit {
            link_id,
            referrer: referrer.to_string(),
            user_agent: "test-agent".to_string(),
            ip_hash: String::new(),
            created_at: at,
        })
        .await
        .unwrap();
    }
}

pub async fn clicks_of(pool: &SqlitePool, link_id: i64) -> i64 {
    sqlx::query_scalar("SELECT clicks FROM links WHERE id = ?1")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn visits_of(pool: &SqlitePool, link_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM visits WHERE link_id = ?1")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}
