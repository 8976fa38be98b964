//! Visit entity: one recorded redirect.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Label used in referrer histograms for visits without a referrer.
pub const DIRECT_REFERRER: &str = "Direct";

/// An immutable entry of the visit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub id: i64,
    pub link_id: i64,
    /// Empty means direct traffic.
    pub referrer: String,
    pub user_agent: String,
    /// Anonymized caller identity, never a raw IP address.
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for appending a visit.
///
/// Metadata is expected to be already normalized; see
/// [`crate::application::services::VisitRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub link_id: i64,
    pub referrer: String,
    pub user_agent: String,
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Number of visits coming from one referrer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerCount {
    pub referrer: String,
    pub count: i64,
}

/// Number of visits on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Optional time window restricting stats queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl StatsWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Window covering whole UTC calendar days, both ends inclusive.
    pub fn days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(start_of_day),
            to: to.map(end_of_day),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last nanosecond of `date` in UTC.
///
/// Stored timestamps keep sub-second precision, so a bound at `23:59:59`
/// would exclude visits later in that second.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| start_of_day(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_unbounded() {
        assert!(StatsWindow::default().is_unbounded());
        assert!(!StatsWindow::new(Some(Utc::now()), None).is_unbounded());
    }

    #[test]
    fn test_day_window_spans_whole_days() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = StatsWindow::days(Some(day), Some(day));

        let from = window.from.unwrap();
        let to = window.to.unwrap();
        assert_eq!(from.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(to.date_naive(), day);
        assert_eq!(to.timestamp_subsec_nanos(), 999_999_999);
        assert_eq!(to + chrono::Duration::nanoseconds(1), start_of_day(day.succ_opt().unwrap()));
    }
}
