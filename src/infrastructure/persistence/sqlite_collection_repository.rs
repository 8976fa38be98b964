//! SQLite implementation of the collection repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;

use super::database::contains_pattern;
use super::rows::{COLLECTION_COLUMNS, CollectionRow, LinkRow};
use crate::domain::entities::{Collection, CollectionUpdate, Link, NewCollection};
use crate::domain::repositories::CollectionRepository;
use crate::error::AppError;

/// SQLite repository for collections and their membership table.
pub struct SqliteCollectionRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteCollectionRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

fn slug_conflict(slug: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| match AppError::from(e) {
        AppError::Conflict { .. } => {
            AppError::conflict("Slug already exists", json!({ "slug": slug }))
        }
        other => other,
    }
}

#[async_trait]
impl CollectionRepository for SqliteCollectionRepository {
    async fn create(&self, new_collection: NewCollection) -> Result<Collection, AppError> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO collections (slug, title, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING {COLLECTION_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CollectionRow>(&sql)
            .bind(&new_collection.slug)
            .bind(&new_collection.title)
            .bind(&new_collection.description)
            .bind(now)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(slug_conflict(&new_collection.slug))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Collection>, AppError> {
        let sql = format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = ?1");

        let row = sqlx::query_as::<_, CollectionRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Collection::from))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Collection>, AppError> {
        let sql = format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE slug = ?1");

        let row = sqlx::query_as::<_, CollectionRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Collection::from))
    }

    async fn update(&self, id: i64, update: CollectionUpdate) -> Result<Collection, AppError> {
        let sql = format!(
            r#"
            UPDATE collections
            SET slug = ?1, title = ?2, description = ?3, updated_at = ?4
            WHERE id = ?5
            RETURNING {COLLECTION_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, CollectionRow>(&sql)
            .bind(&update.slug)
            .bind(&update.title)
            .bind(&update.description)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(slug_conflict(&update.slug))?;

        row.map(Collection::from)
            .ok_or_else(|| AppError::not_found("Collection not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        search: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Collection>, AppError> {
        let sql = format!(
            r#"
            SELECT {COLLECTION_COLUMNS}
            FROM collections
            WHERE (?1 IS NULL OR title LIKE ?1 ESCAPE '\' OR slug LIKE ?1 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#
        );

        let rows = sqlx::query_as::<_, CollectionRow>(&sql)
            .bind(search.as_deref().map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Collection::from).collect())
    }

    async fn count(&self, search: Option<String>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM collections
            WHERE (?1 IS NULL OR title LIKE ?1 ESCAPE '\' OR slug LIKE ?1 ESCAPE '\')
            "#,
        )
        .bind(search.as_deref().map(contains_pattern))
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn add_link(&self, collection_id: i64, link_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO collection_links (collection_id, link_id, sort_order)
            VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM collection_links WHERE collection_id = ?1)
            )
            "#,
        )
        .bind(collection_id)
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict { .. } => AppError::conflict(
                "Link is already in the collection",
                json!({ "collection_id": collection_id, "link_id": link_id }),
            ),
            other => other,
        })?;

        Ok(())
    }

    async fn remove_link(&self, collection_id: i64, link_id: i64) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM collection_links WHERE collection_id = ?1 AND link_id = ?2")
                .bind(collection_id)
                .bind(link_id)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reorder(&self, collection_id: i64, link_ids: Vec<i64>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT link_id FROM collection_links
            WHERE collection_id = ?1
            ORDER BY sort_order ASC, link_id ASC
            "#,
        )
        .bind(collection_id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(outsider) = link_ids.iter().find(|id| !current.contains(id)) {
            return Err(AppError::not_found(
                "Link is not in the collection",
                json!({ "collection_id": collection_id, "link_id": outsider }),
            ));
        }

        // Unlisted members follow the listed ones in their previous order.
        let rest = current.into_iter().filter(|id| !link_ids.contains(id));
        let order: Vec<i64> = link_ids.iter().copied().chain(rest).collect();

        for (position, link_id) in order.iter().enumerate() {
            let sort_order = i64::try_from(position).unwrap_or(i64::MAX - 1) + 1;

            sqlx::query(
                r#"
                UPDATE collection_links
                SET sort_order = ?1
                WHERE collection_id = ?2 AND link_id = ?3
                "#,
            )
            .bind(sort_order)
            .bind(collection_id)
            .bind(link_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn links(&self, collection_id: i64) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT l.id, l.original_url, l.short_code, l.title, l.tags, l.clicks,
                   l.created_at, l.updated_at, l.deleted_at
            FROM links l
            JOIN collection_links cl ON cl.link_id = l.id
            WHERE cl.collection_id = ?1 AND l.deleted_at IS NULL
            ORDER BY cl.sort_order ASC, l.id ASC
            "#,
        )
        .bind(collection_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn member_ids(&self, collection_id: i64) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT link_id
            FROM collection_links
            WHERE collection_id = ?1
            ORDER BY sort_order ASC, link_id ASC
            "#,
        )
        .bind(collection_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(ids)
    }
}
