//! Row types shared by the SQLite repositories.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::domain::entities::{Collection, Link, Visit};

pub(crate) const LINK_COLUMNS: &str =
    "id, original_url, short_code, title, tags, clicks, created_at, updated_at, deleted_at";

#[derive(Debug, FromRow)]
pub(crate) struct LinkRow {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub title: String,
    pub tags: Json<Vec<String>>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            original_url: row.original_url,
            short_code: row.short_code,
            title: row.title,
            tags: row.tags.0,
            clicks: row.clicks,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VisitRow {
    pub id: i64,
    pub link_id: i64,
    pub referrer: String,
    pub user_agent: String,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Visit {
            id: row.id,
            link_id: row.link_id,
            referrer: row.referrer,
            user_agent: row.user_agent,
            ip_hash: row.ip_hash,
            created_at: row.created_at,
        }
    }
}

pub(crate) const COLLECTION_COLUMNS: &str = "id, slug, title, description, created_at, updated_at";

#[derive(Debug, FromRow)]
pub(crate) struct CollectionRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Collection {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
            links: Vec::new(),
        }
    }
}
