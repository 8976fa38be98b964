//! SQLite implementation of the link store.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use sqlx::types::Json;
use std::sync::Arc;

use super::database::contains_pattern;
use super::rows::{LINK_COLUMNS, LinkRow};
use crate::domain::entities::{Link, LinkFilter, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// SQLite repository for link storage, listing and click ranking.
pub struct SqliteLinkRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

struct FilterBinds {
    search: Option<String>,
    tag: Option<String>,
    url_contains: Option<String>,
}

impl From<&LinkFilter> for FilterBinds {
    fn from(filter: &LinkFilter) -> Self {
        Self {
            search: filter.search.as_deref().map(contains_pattern),
            tag: filter.tag.clone(),
            url_contains: filter.url_contains.as_deref().map(contains_pattern),
        }
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            INSERT INTO links (original_url, short_code, title, tags, clicks, created_at, updated_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5, ?6)
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.original_url)
            .bind(&new_link.short_code)
            .bind(&new_link.title)
            .bind(Json(&new_link.tags))
            .bind(new_link.created_at)
            .bind(new_link.deleted_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict { .. } => AppError::conflict(
                    "Short code already exists",
                    json!({ "short_code": new_link.short_code }),
                ),
                other => other,
            })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = ?1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_code = ?1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(short_code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn list(
        &self,
        filter: &LinkFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError> {
        let binds = FilterBinds::from(filter);
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE deleted_at IS NULL
              AND (?1 IS NULL OR title LIKE ?1 ESCAPE '\' OR original_url LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR EXISTS (SELECT 1 FROM json_each(links.tags) WHERE json_each.value = ?2))
              AND (?3 IS NULL OR original_url LIKE ?3 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT ?4 OFFSET ?5
            "#
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(binds.search)
            .bind(binds.tag)
            .bind(binds.url_contains)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count(&self, filter: &LinkFilter) -> Result<i64, AppError> {
        let binds = FilterBinds::from(filter);

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM links
            WHERE deleted_at IS NULL
              AND (?1 IS NULL OR title LIKE ?1 ESCAPE '\' OR original_url LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR EXISTS (SELECT 1 FROM json_each(links.tags) WHERE json_each.value = ?2))
              AND (?3 IS NULL OR original_url LIKE ?3 ESCAPE '\')
            "#,
        )
        .bind(binds.search)
        .bind(binds.tag)
        .bind(binds.url_contains)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            UPDATE links
            SET original_url = COALESCE(?1, original_url),
                title        = COALESCE(?2, title),
                tags         = COALESCE(?3, tags),
                updated_at   = ?4
            WHERE id = ?5 AND deleted_at IS NULL
            RETURNING {LINK_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(patch.original_url)
            .bind(patch.title)
            .bind(patch.tags.map(Json))
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = ?1, updated_at = ?1
            WHERE id = ?2 AND deleted_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn restore(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = NULL, updated_at = ?1
            WHERE id = ?2 AND deleted_at IS NOT NULL
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn dump(&self) -> Result<Vec<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links ORDER BY id ASC");

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn top_by_clicks(
        &self,
        filter: &LinkFilter,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let binds = FilterBinds::from(filter);
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE deleted_at IS NULL
              AND (?1 IS NULL OR title LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR EXISTS (SELECT 1 FROM json_each(links.tags) WHERE json_each.value = ?2))
              AND (?3 IS NULL OR original_url LIKE ?3 ESCAPE '\')
            ORDER BY clicks DESC, id ASC
            LIMIT ?4
            "#
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(binds.search)
            .bind(binds.tag)
            .bind(binds.url_contains)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0) FROM links WHERE deleted_at IS NULL")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(total)
    }
}
