//! Repository trait for the link store.

use crate::domain::entities::{Link, LinkFilter, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Lookups by id or code return soft-deleted links too, so callers can tell
/// "never existed" apart from "deleted"; every listing and ranking excludes
/// them. The click counter is not writable here, see
/// [`crate::domain::repositories::VisitRepository::record`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteLinkRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link with a zero click counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    /// Returns [`AppError::Storage`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by id, including soft-deleted ones.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds a link by short code, including soft-deleted ones.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<Link>, AppError>;

    /// Lists non-deleted links, newest first.
    ///
    /// `filter.search` matches the title or the original URL.
    async fn list(
        &self,
        filter: &LinkFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts non-deleted links matching the same filter as [`Self::list`].
    async fn count(&self, filter: &LinkFilter) -> Result<i64, AppError>;

    /// Applies a partial update and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no non-deleted link has this id.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError>;

    /// Soft-deletes a link by setting `deleted_at = now`.
    ///
    /// Returns `Ok(false)` if the link was not found or already deleted.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Clears `deleted_at`. Returns `Ok(false)` if the link is missing or not deleted.
    async fn restore(&self, id: i64) -> Result<bool, AppError>;

    /// Every link, soft-deleted included, in id order.
    async fn dump(&self) -> Result<Vec<Link>, AppError>;

    /// Non-deleted links matching `filter`, ordered by clicks descending then id.
    ///
    /// `filter.search` matches the title only; `filter.url_contains` matches
    /// the original URL.
    async fn top_by_clicks(&self, filter: &LinkFilter, limit: i64)
    -> Result<Vec<Link>, AppError>;

    /// Sum of click counters over non-deleted links.
    async fn total_clicks(&self) -> Result<i64, AppError>;
}
