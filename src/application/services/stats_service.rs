//! Per-link statistics and the dashboard ranking.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::application::pagination::MAX_PAGE_SIZE;
use crate::domain::entities::{DailyCount, Link, LinkFilter, ReferrerCount, StatsWindow};
use crate::domain::repositories::{LinkRepository, VisitRepository};
use crate::error::AppError;

/// Referrers kept in a link's histogram.
pub const TOP_REFERRERS: i64 = 10;
/// Most recent active days kept in a link's daily series.
pub const DAILY_SERIES_DAYS: i64 = 30;
/// Dashboard size when no usable limit is given.
pub const DEFAULT_DASHBOARD_LIMIT: i64 = 10;

/// Aggregated visits of one link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub link_id: i64,
    pub short_code: String,
    pub total_clicks: i64,
    /// Count descending, then referrer ascending; at most [`TOP_REFERRERS`].
    pub referrers: Vec<ReferrerCount>,
    /// Newest day first; days without visits are omitted.
    pub daily: Vec<DailyCount>,
}

/// Dashboard request. Filters are ANDed; blank filters are ignored.
#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    pub limit: Option<i64>,
    pub filter: LinkFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub links: Vec<Link>,
    /// Sum of click counters over every live link, regardless of filters.
    pub total_clicks: i64,
}

/// Read-only reporting over the link store and the visit log.
pub struct StatsService<L: LinkRepository + ?Sized, V: VisitRepository + ?Sized> {
    link_repository: Arc<L>,
    visit_repository: Arc<V>,
}

impl<L, V> StatsService<L, V>
where
    L: LinkRepository + ?Sized,
    V: VisitRepository + ?Sized,
{
    /// Creates a new statistics service.
    pub fn new(link_repository: Arc<L>, visit_repository: Arc<V>) -> Self {
        Self {
            link_repository,
            visit_repository,
        }
    }

    /// Computes total clicks, top referrers and the daily series of a link.
    ///
    /// With an unbounded window the total is the link's click counter, which
    /// always equals its visit count. A bounded window counts the visit log.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link is missing or soft-deleted.
    pub async fn get_link_stats(
        &self,
        link_id: i64,
        window: StatsWindow,
    ) -> Result<LinkStats, AppError> {
        let link = self
            .link_repository
            .find_by_id(link_id)
            .await?
            .filter(|link| !link.is_deleted())
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link_id })))?;

        self.stats_for(link, window).await
    }

    /// Same as [`Self::get_link_stats`], looked up by short code.
    pub async fn get_link_stats_by_code(
        &self,
        short_code: &str,
        window: StatsWindow,
    ) -> Result<LinkStats, AppError> {
        let link = self
            .link_repository
            .find_by_code(short_code)
            .await?
            .filter(|link| !link.is_deleted())
            .ok_or_else(|| {
                AppError::not_found("Statistics not found", json!({ "short_code": short_code }))
            })?;

        self.stats_for(link, window).await
    }

    /// Ranks live links by clicks and sums every live counter.
    ///
    /// `limit` of `None` or `<= 0` means 10; larger values are capped.
    /// Equal click counts keep creation order.
    pub async fn get_dashboard(&self, query: DashboardQuery) -> Result<Dashboard, AppError> {
        let limit = dashboard_limit(query.limit);
        let filter = query.filter.normalized();

        let links = self.link_repository.top_by_clicks(&filter, limit).await?;
        let total_clicks = self.link_repository.total_clicks().await?;

        Ok(Dashboard {
            links,
            total_clicks,
        })
    }

    async fn stats_for(&self, link: Link, window: StatsWindow) -> Result<LinkStats, AppError> {
        let total_clicks = if window.is_unbounded() {
            link.clicks
        } else {
            self.visit_repository.count_for_link(link.id, window).await?
        };

        let referrers = self
            .visit_repository
            .referrer_counts(link.id, window, TOP_REFERRERS)
            .await?;

        let daily = self
            .visit_repository
            .daily_counts(link.id, window, DAILY_SERIES_DAYS)
            .await?;

        Ok(LinkStats {
            link_id: link.id,
            short_code: link.short_code,
            total_clicks,
            referrers,
            daily,
        })
    }
}

fn dashboard_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n.min(MAX_PAGE_SIZE),
        _ => DEFAULT_DASHBOARD_LIMIT,
    }
}
