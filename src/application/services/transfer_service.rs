//! JSON export and import of the link store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::services::link_service::normalize_tags;
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// One exported link.
///
/// `clicks` is informational: imported links always start at zero because
/// their visits are not part of the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub short_code: String,
    pub original_url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Link> for LinkRecord {
    fn from(link: Link) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            title: link.title,
            tags: link.tags,
            clicks: link.clicks,
            created_at: link.created_at,
            deleted_at: link.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub short_code: String,
    pub reason: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    /// Records whose short code already exists.
    pub skipped: usize,
    pub failed: Vec<ImportFailure>,
}

pub struct TransferService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> TransferService<L> {
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Every link, soft-deleted ones included, ordered by id.
    pub async fn export(&self) -> Result<Vec<LinkRecord>, AppError> {
        let links = self.link_repository.dump().await?;
        Ok(links.into_iter().map(LinkRecord::from).collect())
    }

    /// Imports records one by one.
    ///
    /// Existing short codes are skipped. Invalid records are reported and do
    /// not stop the run; storage errors abort it.
    pub async fn import(&self, records: Vec<LinkRecord>) -> Result<ImportReport, AppError> {
        let mut report = ImportReport::default();

        for record in records {
            let short_code = record.short_code.trim().to_string();

            if short_code.is_empty() {
                report.failed.push(ImportFailure {
                    short_code,
                    reason: "Short code is empty".to_string(),
                });
                continue;
            }

            if self.link_repository.find_by_code(&short_code).await?.is_some() {
                tracing::debug!(short_code = %short_code, "Skipping existing code");
                report.skipped += 1;
                continue;
            }

            let original_url = match normalize_url(&record.original_url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(short_code = %short_code, "Failed to import: {}", e);
                    report.failed.push(ImportFailure {
                        short_code,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let new_link = NewLink {
                original_url,
                short_code: short_code.clone(),
                title: record.title.trim().to_string(),
                tags: normalize_tags(record.tags),
                created_at: record.created_at,
                deleted_at: record.deleted_at,
            };

            match self.link_repository.create(new_link).await {
                Ok(_) => report.imported += 1,
                Err(AppError::Conflict { .. }) => report.skipped += 1,
                Err(e @ AppError::Storage { .. }) => return Err(e),
                Err(e) => report.failed.push(ImportFailure {
                    short_code,
                    reason: e.to_string(),
                }),
            }
        }

        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Import finished"
        );

        Ok(report)
    }
}

/// Parses an exported JSON array.
pub fn parse_records(input: &str) -> Result<Vec<LinkRecord>, AppError> {
    serde_json::from_str(input).map_err(|e| {
        AppError::bad_request(
            "Invalid export file",
            json!({ "reason": e.to_string(), "line": e.line(), "column": e.column() }),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;

    fn record(code: &str, url: &str) -> LinkRecord {
        LinkRecord {
            short_code: code.to_string(),
            original_url: url.to_string(),
            title: "t".to_string(),
            tags: vec!["a".to_string()],
            clicks: 42,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_parse_records_applies_defaults() {
        let records =
            parse_records(r#"[{"short_code":"abc","original_url":"https://example.com/"}]"#)
                .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].clicks, 0);
        assert!(records[0].tags.is_empty());
        assert!(records[0].deleted_at.is_none());
    }

    #[test]
    fn test_parse_records_rejects_garbage() {
        let err = parse_records("{not json").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_import_skips_existing_and_reports_invalid() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_code().returning(|code| {
            if code == "taken" {
                let now = Utc::now();
                Ok(Some(Link {
                    id: 1,
                    original_url: "https://example.com/".to_string(),
                    short_code: code.to_string(),
                    title: String::new(),
                    tags: vec![],
                    clicks: 0,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                }))
            } else {
                Ok(None)
            }
        });
        mock_repo
            .expect_create()
            .withf(|l| l.short_code == "fresh" && l.original_url == "https://example.org/")
            .times(1)
            .returning(|l| {
                Ok(Link {
                    id: 2,
                    original_url: l.original_url,
                    short_code: l.short_code,
                    title: l.title,
                    tags: l.tags,
                    clicks: 0,
                    created_at: l.created_at,
                    updated_at: l.created_at,
                    deleted_at: l.deleted_at,
                })
            });

        let service = TransferService::new(Arc::new(mock_repo));
        let report = service
            .import(vec![
                record("taken", "https://example.com"),
                record("fresh", "https://EXAMPLE.org"),
                record("broken", "ftp://example.org"),
                record("  ", "https://example.org"),
            ])
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].short_code, "broken");
    }
}
