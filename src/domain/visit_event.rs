//! Visit event model for asynchronous visit recording.

use chrono::{DateTime, Utc};

/// An in-memory representation of a redirect, queued for recording.
///
/// Built by the redirect path after the short code has been resolved, then
/// handed to [`crate::domain::visit_worker::VisitQueue`] so the redirect
/// response never waits on the database.
///
/// Client metadata is optional to handle missing headers gracefully; the raw
/// caller IP only lives in memory and is hashed before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub link_id: i64,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl VisitEvent {
    /// Creates a visit event stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = VisitEvent::new(
    ///     42,
    ///     Some("https://google.com"),
    ///     Some("Mozilla/5.0"),
    ///     Some("192.168.1.1".to_string()),
    /// );
    /// ```
    pub fn new(
        link_id: i64,
        referrer: Option<&str>,
        user_agent: Option<&str>,
        ip: Option<String>,
    ) -> Self {
        Self {
            link_id,
            referrer: referrer.map(|s| s.to_string()),
            user_agent: user_agent.map(|s| s.to_string()),
            ip,
            occurred_at: Utc::now(),
        }
    }

    /// Overrides the event timestamp.
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_visit_event_creation_full() {
        let event = VisitEvent::new(
            7,
            Some("https://google.com"),
            Some("Mozilla/5.0"),
            Some("192.168.1.1".to_string()),
        );

        assert_eq!(event.link_id, 7);
        assert_eq!(event.referrer.as_deref(), Some("https://google.com"));
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(event.ip.as_deref(), Some("192.168.1.1"));
    }

    #[test]
    fn test_visit_event_creation_minimal() {
        let event = VisitEvent::new(1, None, None, None);

        assert!(event.referrer.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.ip.is_none());
    }

    #[test]
    fn test_visit_event_at_overrides_timestamp() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let event = VisitEvent::new(1, None, None, None).at(when);
        assert_eq!(event.occurred_at, when);
    }
}
