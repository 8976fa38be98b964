//! Collection entity: an ordered, shareable group of links.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::link::Link;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Populated only when a single collection is fetched with its members.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone)]
pub struct NewCollection {
    pub slug: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CollectionUpdate {
    pub slug: String,
    pub title: String,
    pub description: String,
}
