//! Repository trait for the visit log.

use crate::domain::entities::{DailyCount, NewVisit, ReferrerCount, StatsWindow, Visit};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the append-only visit log.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqliteVisitRepository`] - SQLite implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Appends a visit and increments the owning link's click counter.
    ///
    /// Both writes happen in one transaction: either the visit row exists and
    /// the counter moved by exactly one, or neither happened.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist.
    /// Returns [`AppError::Storage`] on database errors; nothing is written.
    async fn record(&self, new_visit: NewVisit) -> Result<Visit, AppError>;

    /// Counts visits of a link inside the window.
    async fn count_for_link(&self, link_id: i64, window: StatsWindow) -> Result<i64, AppError>;

    /// Top referrers of a link, count descending then referrer ascending.
    ///
    /// Empty referrers are grouped under [`crate::domain::entities::DIRECT_REFERRER`].
    async fn referrer_counts(
        &self,
        link_id: i64,
        window: StatsWindow,
        limit: i64,
    ) -> Result<Vec<ReferrerCount>, AppError>;

    /// Most recent days with at least one visit, newest first.
    async fn daily_counts(
        &self,
        link_id: i64,
        window: StatsWindow,
        limit: i64,
    ) -> Result<Vec<DailyCount>, AppError>;
}
