//! SQLite implementation of the visit log.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::rows::VisitRow;
use crate::domain::entities::{
    DIRECT_REFERRER, DailyCount, NewVisit, ReferrerCount, StatsWindow, Visit,
};
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

/// SQLite repository for recording visits and aggregating them.
pub struct SqliteVisitRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteVisitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for SqliteVisitRepository {
    async fn record(&self, new_visit: NewVisit) -> Result<Visit, AppError> {
        let mut tx = self.pool.begin().await?;

        // Counter first: takes the write lock up front and tells us whether
        // the link exists before anything is appended.
        let updated = sqlx::query("UPDATE links SET clicks = clicks + 1 WHERE id = ?1")
            .bind(new_visit.link_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": new_visit.link_id }),
            ));
        }

        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            INSERT INTO visits (link_id, referrer, user_agent, ip_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, link_id, referrer, user_agent, ip_hash, created_at
            "#,
        )
        .bind(new_visit.link_id)
        .bind(&new_visit.referrer)
        .bind(&new_visit.user_agent)
        .bind(&new_visit.ip_hash)
        .bind(new_visit.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn count_for_link(&self, link_id: i64, window: StatsWindow) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM visits
            WHERE link_id = ?1
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at <= ?3)
            "#,
        )
        .bind(link_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn referrer_counts(
        &self,
        link_id: i64,
        window: StatsWindow,
        limit: i64,
    ) -> Result<Vec<ReferrerCount>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT CASE WHEN referrer = '' THEN ?5 ELSE referrer END AS label,
                   COUNT(*) AS visits
            FROM visits
            WHERE link_id = ?1
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at <= ?3)
            GROUP BY label
            ORDER BY visits DESC, label ASC
            LIMIT ?4
            "#,
        )
        .bind(link_id)
        .bind(window.from)
        .bind(window.to)
        .bind(limit)
        .bind(DIRECT_REFERRER)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(referrer, count)| ReferrerCount { referrer, count })
            .collect())
    }

    async fn daily_counts(
        &self,
        link_id: i64,
        window: StatsWindow,
        limit: i64,
    ) -> Result<Vec<DailyCount>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT date(created_at) AS day, COUNT(*) AS visits
            FROM visits
            WHERE link_id = ?1
              AND (?2 IS NULL OR created_at >= ?2)
              AND (?3 IS NULL OR created_at <= ?3)
            GROUP BY day
            ORDER BY day DESC
            LIMIT ?4
            "#,
        )
        .bind(link_id)
        .bind(window.from)
        .bind(window.to)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter()
            .map(|(day, count)| {
                NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map(|date| DailyCount { date, count })
                    .map_err(|e| {
                        AppError::storage(
                            "Unreadable visit date",
                            json!({ "value": day, "reason": e.to_string() }),
                        )
                    })
            })
            .collect()
    }
}
