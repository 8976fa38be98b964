//! Visit recording: turns a queued event into one visit-log row plus one
//! counter increment.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{NewVisit, Visit};
use crate::domain::repositories::VisitRepository;
use crate::domain::visit_event::VisitEvent;
use crate::domain::visit_worker::VisitSink;
use crate::error::AppError;
use crate::utils::ip_hash::anonymize_ip;

/// Records visits through the visit repository.
///
/// Metadata is normalized before it is stored: referrer and user agent are
/// trimmed (absent becomes empty) and the caller IP is replaced by a salted
/// hash. The counter increment and the log append happen in a single
/// repository transaction, so a failed call leaves no trace.
pub struct VisitRecorder<V: VisitRepository + ?Sized> {
    visit_repository: Arc<V>,
    ip_hash_salt: String,
}

impl<V: VisitRepository + ?Sized> VisitRecorder<V> {
    pub fn new(visit_repository: Arc<V>, ip_hash_salt: impl Into<String>) -> Self {
        Self {
            visit_repository,
            ip_hash_salt: ip_hash_salt.into(),
        }
    }

    /// Records a visit synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist and
    /// [`AppError::Storage`] if the transaction fails.
    pub async fn record_visit(&self, event: VisitEvent) -> Result<Visit, AppError> {
        let new_visit = NewVisit {
            link_id: event.link_id,
            referrer: clean(event.referrer.as_deref()),
            user_agent: clean(event.user_agent.as_deref()),
            ip_hash: anonymize_ip(event.ip.as_deref(), &self.ip_hash_salt),
            created_at: event.occurred_at,
        };

        self.visit_repository.record(new_visit).await
    }
}

#[async_trait]
impl<V: VisitRepository + ?Sized> VisitSink for VisitRecorder<V> {
    async fn record(&self, event: VisitEvent) -> Result<Visit, AppError> {
        self.record_visit(event).await
    }
}

fn clean(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
