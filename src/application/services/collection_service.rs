//! Collections: ordered, shareable groups of links.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use crate::application::pagination::{PageRequest, Paginated};
use crate::domain::entities::{Collection, CollectionUpdate, NewCollection};
use crate::domain::repositories::{CollectionRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::slug::validate_slug;

pub struct CollectionService<C, L>
where
    C: CollectionRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    collection_repository: Arc<C>,
    link_repository: Arc<L>,
}

impl<C, L> CollectionService<C, L>
where
    C: CollectionRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    pub fn new(collection_repository: Arc<C>, link_repository: Arc<L>) -> Self {
        Self {
            collection_repository,
            link_repository,
        }
    }

    /// Creates an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed slug and
    /// [`AppError::Conflict`] if the slug is taken.
    pub async fn create(&self, new_collection: NewCollection) -> Result<Collection, AppError> {
        let new_collection = NewCollection {
            slug: new_collection.slug.trim().to_string(),
            title: new_collection.title.trim().to_string(),
            description: new_collection.description.trim().to_string(),
        };

        validate_slug(&new_collection.slug)?;
        self.ensure_slug_free(&new_collection.slug).await?;

        let collection = self.collection_repository.create(new_collection).await?;
        tracing::info!(collection_id = collection.id, slug = %collection.slug, "Collection created");

        Ok(collection)
    }

    /// Fetches a collection with its live links in display order.
    pub async fn get(&self, id: i64) -> Result<Collection, AppError> {
        let collection = self
            .collection_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Collection not found", json!({ "id": id })))?;

        self.with_links(collection).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Collection, AppError> {
        let collection = self
            .collection_repository
            .find_by_slug(slug.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Collection not found", json!({ "slug": slug })))?;

        self.with_links(collection).await
    }

    /// Replaces title, slug and description. Slug uniqueness is re-checked
    /// only when the slug changes.
    pub async fn update(&self, id: i64, update: CollectionUpdate) -> Result<Collection, AppError> {
        let update = CollectionUpdate {
            slug: update.slug.trim().to_string(),
            title: update.title.trim().to_string(),
            description: update.description.trim().to_string(),
        };

        validate_slug(&update.slug)?;

        let current = self
            .collection_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Collection not found", json!({ "id": id })))?;

        if current.slug != update.slug {
            self.ensure_slug_free(&update.slug).await?;
        }

        self.collection_repository.update(id, update).await
    }

    /// Deletes a collection and its memberships. Links are untouched.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.collection_repository.delete(id).await? {
            return Err(AppError::not_found(
                "Collection not found",
                json!({ "id": id }),
            ));
        }

        tracing::info!(collection_id = id, "Collection deleted");
        Ok(())
    }

    /// Lists collections newest first; `search` matches title or slug.
    pub async fn list(
        &self,
        page: PageRequest,
        search: Option<String>,
    ) -> Result<Paginated<Collection>, AppError> {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let total = self.collection_repository.count(search.clone()).await?;
        let items = self
            .collection_repository
            .list(search, page.limit, page.offset())
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    /// Appends a live link at the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the collection or link is missing
    /// (or the link is soft-deleted) and [`AppError::Conflict`] if the link is
    /// already a member.
    pub async fn add_link(&self, collection_id: i64, link_id: i64) -> Result<(), AppError> {
        self.ensure_collection(collection_id).await?;

        let live = self
            .link_repository
            .find_by_id(link_id)
            .await?
            .is_some_and(|link| !link.is_deleted());
        if !live {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "id": link_id }),
            ));
        }

        self.collection_repository
            .add_link(collection_id, link_id)
            .await
    }

    pub async fn remove_link(&self, collection_id: i64, link_id: i64) -> Result<(), AppError> {
        if !self
            .collection_repository
            .remove_link(collection_id, link_id)
            .await?
        {
            return Err(AppError::not_found(
                "Link is not in the collection",
                json!({ "collection_id": collection_id, "link_id": link_id }),
            ));
        }

        Ok(())
    }

    /// Moves `link_ids` to the front of the collection in the given order.
    ///
    /// Every id must already be a member; duplicates are rejected. Members not
    /// listed follow in their previous relative order.
    pub async fn reorder(&self, collection_id: i64, link_ids: Vec<i64>) -> Result<(), AppError> {
        self.ensure_collection(collection_id).await?;

        let mut seen = HashSet::with_capacity(link_ids.len());
        if let Some(duplicate) = link_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::bad_request(
                "Link ids must be unique",
                json!({ "link_id": duplicate }),
            ));
        }

        let members: HashSet<i64> = self
            .collection_repository
            .member_ids(collection_id)
            .await?
            .into_iter()
            .collect();

        let missing: Vec<i64> = link_ids
            .iter()
            .copied()
            .filter(|id| !members.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::not_found(
                "Links are not in the collection",
                json!({ "collection_id": collection_id, "link_ids": missing }),
            ));
        }

        self.collection_repository
            .reorder(collection_id, link_ids)
            .await
    }

    async fn with_links(&self, mut collection: Collection) -> Result<Collection, AppError> {
        collection.links = self.collection_repository.links(collection.id).await?;
        Ok(collection)
    }

    async fn ensure_collection(&self, id: i64) -> Result<(), AppError> {
        match self.collection_repository.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(
                "Collection not found",
                json!({ "id": id }),
            )),
        }
    }

    async fn ensure_slug_free(&self, slug: &str) -> Result<(), AppError> {
        if self.collection_repository.find_by_slug(slug).await?.is_some() {
            return Err(AppError::conflict(
                "Slug already exists",
                json!({ "slug": slug }),
            ));
        }
        Ok(())
    }
}
