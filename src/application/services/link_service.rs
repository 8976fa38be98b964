//! Link creation, lookup and lifecycle service.

use std::sync::Arc;

use crate::application::pagination::{PageRequest, Paginated};
use crate::domain::entities::{Link, LinkFilter, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::url_normalizer::normalize_url;
use serde_json::json;

/// Default length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Input for [`LinkService::shorten`].
#[derive(Debug, Clone, Default)]
pub struct ShortenRequest {
    pub original_url: String,
    pub title: String,
    pub tags: Vec<String>,
    pub custom_code: Option<String>,
}

/// Service for creating, resolving and managing shortened links.
///
/// Handles URL normalization, code generation/validation and the soft-delete
/// lifecycle. The click counter is never touched here.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    code_length: usize,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, code_length: usize) -> Self {
        Self {
            link_repository,
            code_length,
        }
    }

    /// Creates a short link.
    ///
    /// # Code Generation
    ///
    /// - If `custom_code` is provided, validates and uses it (or returns conflict error)
    /// - Otherwise, generates a random alphanumeric code of the configured length
    /// - Retries up to 10 times on collision before failing
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom code is invalid.
    /// Returns [`AppError::Conflict`] if the custom code is already taken,
    /// including by a soft-deleted link.
    pub async fn shorten(&self, request: ShortenRequest) -> Result<Link, AppError> {
        let original_url = normalize(&request.original_url)?;

        let short_code = match request.custom_code.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => {
                validate_custom_code(custom)?;

                if self.link_repository.find_by_code(custom).await?.is_some() {
                    return Err(AppError::conflict(
                        "Custom code already exists",
                        json!({ "short_code": custom }),
                    ));
                }

                custom.to_string()
            }
            _ => self.generate_unique_code().await?,
        };

        let new_link = NewLink::new(
            original_url,
            short_code,
            request.title.trim().to_string(),
            normalize_tags(request.tags),
        );

        let link = self.link_repository.create(new_link).await?;
        tracing::info!(link_id = link.id, short_code = %link.short_code, "Link created");

        Ok(link)
    }

    /// Resolves a short code to its live link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or the link is
    /// soft-deleted.
    pub async fn resolve(&self, short_code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(short_code.trim())
            .await?
            .filter(|link| !link.is_deleted())
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "short_code": short_code }))
            })
    }

    /// Retrieves a live link by id.
    pub async fn get(&self, id: i64) -> Result<Link, AppError> {
        self.link_repository
            .find_by_id(id)
            .await?
            .filter(|link| !link.is_deleted())
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Applies a partial update. An empty patch returns the link unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for missing or soft-deleted links and
    /// [`AppError::Validation`] for an invalid replacement URL.
    pub async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let patch = LinkPatch {
            original_url: patch.original_url.as_deref().map(normalize).transpose()?,
            title: patch.title.map(|t| t.trim().to_string()),
            tags: patch.tags.map(normalize_tags),
        };

        let link = self.link_repository.update(id, patch).await?;
        tracing::info!(link_id = link.id, "Link updated");

        Ok(link)
    }

    /// Soft-deletes a link. Its visits and counter are kept.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.link_repository.soft_delete(id).await? {
            return Err(AppError::not_found("Link not found", json!({ "id": id })));
        }

        tracing::info!(link_id = id, "Link deleted");
        Ok(())
    }

    /// Clears the deletion marker of a soft-deleted link.
    pub async fn restore(&self, id: i64) -> Result<Link, AppError> {
        if !self.link_repository.restore(id).await? {
            return Err(AppError::not_found(
                "Deleted link not found",
                json!({ "id": id }),
            ));
        }

        tracing::info!(link_id = id, "Link restored");
        self.get(id).await
    }

    /// Lists live links, newest first.
    ///
    /// `search` matches the title or the original URL.
    pub async fn list(
        &self,
        page: PageRequest,
        search: Option<String>,
        tag: Option<String>,
    ) -> Result<Paginated<Link>, AppError> {
        let filter = LinkFilter {
            search,
            tag,
            url_contains: None,
        }
        .normalized();

        let total = self.link_repository.count(&filter).await?;
        let items = self
            .link_repository
            .list(&filter, page.limit, page.offset())
            .await?;

        Ok(Paginated::new(items, total, page))
    }

    /// Every stored link, soft-deleted ones included.
    pub async fn dump(&self) -> Result<Vec<Link>, AppError> {
        self.link_repository.dump().await
    }

    async fn generate_unique_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = generate_code(self.code_length);

            if self.link_repository.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
        }

        Err(AppError::conflict(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": MAX_GENERATION_ATTEMPTS }),
        ))
    }
}

/// Builds the public short URL for a code.
pub fn short_url(base_url: &str, short_code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), short_code)
}

fn normalize(url: &str) -> Result<String, AppError> {
    normalize_url(url)
        .map_err(|e| AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() })))
}

/// Trims tags, drops empty ones and removes duplicates keeping first occurrence.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
