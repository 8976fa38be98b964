//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL with its denormalized click counter.
///
/// `clicks` always equals the number of visits recorded for the link; it is
/// only ever changed by the visit recorder, inside the same transaction that
/// appends the visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub title: String,
    pub tags: Vec<String>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Link {
    /// Returns true if the link has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub original_url: String,
    pub short_code: String,
    pub title: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Set only when importing a dump that contains soft-deleted links.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl NewLink {
    pub fn new(original_url: String, short_code: String, title: String, tags: Vec<String>) -> Self {
        Self {
            original_url,
            short_code,
            title,
            tags,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

/// Partial update for an existing link.
///
/// `None` fields are left unchanged. The short code and click counter can
/// never be changed through a patch.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub original_url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        self.original_url.is_none() && self.title.is_none() && self.tags.is_none()
    }
}

/// Filters for listing links. Each filter is optional; present filters are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    /// Substring of the title (dashboard) or of the title or URL (listing).
    pub search: Option<String>,
    pub tag: Option<String>,
    /// Substring of the original URL, typically a domain like `github.com`.
    pub url_contains: Option<String>,
}

impl LinkFilter {
    /// Trims every filter and turns blank strings into "no filter".
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            search: clean(self.search),
            tag: clean(self.tag),
            url_contains: clean(self.url_contains),
        }
    }
}
