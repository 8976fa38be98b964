//! Repository trait for link collections.

use crate::domain::entities::{Collection, CollectionUpdate, Link, NewCollection};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for collections and their ordered membership.
///
/// Collections returned by lookups and listings have an empty `links` field;
/// members are fetched with [`Self::links`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the slug is taken.
    async fn create(&self, new_collection: NewCollection) -> Result<Collection, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Collection>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Collection>, AppError>;

    /// Replaces slug, title and description.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the collection does not exist and
    /// [`AppError::Conflict`] if the new slug is taken.
    async fn update(&self, id: i64, update: CollectionUpdate) -> Result<Collection, AppError>;

    /// Hard-deletes a collection; memberships cascade. Returns `Ok(false)` if missing.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists collections newest first; `search` matches title or slug.
    async fn list(
        &self,
        search: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Collection>, AppError>;

    async fn count(&self, search: Option<String>) -> Result<i64, AppError>;

    /// Appends a link after the current last member.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the link is already a member.
    async fn add_link(&self, collection_id: i64, link_id: i64) -> Result<(), AppError>;

    /// Returns `Ok(false)` if the link was not a member.
    async fn remove_link(&self, collection_id: i64, link_id: i64) -> Result<bool, AppError>;

    /// Moves `link_ids` to the front in the given order, atomically.
    ///
    /// Members not listed follow in their previous relative order, so sort
    /// orders stay `1..=members` without gaps or ties. Returns
    /// [`AppError::NotFound`] and changes nothing if an id is not a member.
    async fn reorder(&self, collection_id: i64, link_ids: Vec<i64>) -> Result<(), AppError>;

    /// Non-deleted member links in sort order.
    async fn links(&self, collection_id: i64) -> Result<Vec<Link>, AppError>;

    /// Ids of every member, soft-deleted links included.
    async fn member_ids(&self, collection_id: i64) -> Result<Vec<i64>, AppError>;
}
