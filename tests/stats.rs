mod common;

use chrono::{Duration, TimeZone, Utc};

use clicktrail::application::services::DashboardQuery;
use clicktrail::domain::entities::{LinkFilter, StatsWindow};
use clicktrail::error::AppError;

#[tokio::test]
async fn test_link_stats_total_matches_counter_and_log() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let link_id = common::create_test_link(&db.pool, "stats", "https://example.com/").await;
    common::record_visits(&db.pool, link_id, "google.com", Utc::now(), 5).await;

    let stats = state
        .stats
        .get_link_stats(link_id, StatsWindow::default())
        .await
        .unwrap();

    assert_eq!(stats.total_clicks, 5);
    assert_eq!(stats.total_clicks, common::visits_of(&db.pool, link_id).await);
    assert_eq!(stats.short_code, "stats");
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let a = common::create_tagged_link(&db.pool, "a", "https://a.com/", "A", &["x"]).await;
    let b = common::create_tagged_link(&db.pool, "b", "https://b.com/", "B", &["x"]).await;
    common::record_visits(&db.pool, a, "", Utc::now(), 2).await;
    common::record_visits(&db.pool, b, "t.co", Utc::now(), 2).await;

    let first = state.stats.get_link_stats(a, StatsWindow::default()).await.unwrap();
    let second = state.stats.get_link_stats(a, StatsWindow::default()).await.unwrap();
    assert_eq!(first, second);

    let first = state.stats.get_dashboard(DashboardQuery::default()).await.unwrap();
    let second = state.stats.get_dashboard(DashboardQuery::default()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_empty_referrer_is_reported_as_direct() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let link_id = common::create_test_link(&db.pool, "refs", "https://example.com/").await;
    common::record_visits(&db.pool, link_id, "", Utc::now(), 1).await;
    common::record_visits(&db.pool, link_id, "google.com", Utc::now(), 1).await;

    let stats = state
        .stats
        .get_link_stats(link_id, StatsWindow::default())
        .await
        .unwrap();

    let histogram: Vec<(&str, i64)> = stats
        .referrers
        .iter()
        .map(|r| (r.referrer.as_str(), r.count))
        .collect();
    assert_eq!(histogram, vec![("Direct", 1), ("google.com", 1)]);
}

#[tokio::test]
async fn test_daily_series_keeps_thirty_most_recent_days() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let link_id = common::create_test_link(&db.pool, "daily", "https://example.com/").await;

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    for offset in 0..40 {
        common::record_visits(&db.pool, link_id, "", start + Duration::days(offset), 1).await;
    }

    let stats = state
        .stats
        .get_link_stats(link_id, StatsWindow::default())
        .await
        .unwrap();

    assert_eq!(stats.total_clicks, 40);
    assert_eq!(stats.daily.len(), 30);
    assert_eq!(stats.daily[0].date, (start + Duration::days(39)).date_naive());
    assert_eq!(stats.daily[29].date, (start + Duration::days(10)).date_naive());
    assert!(stats.daily.windows(2).all(|w| w[0].date > w[1].date));
}

#[tokio::test]
async fn test_stats_for_deleted_link_is_not_found() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let link_id = common::create_test_link(&db.pool, "gone", "https://example.com/").await;
    common::soft_delete_link(&db.pool, link_id).await;

    let result = state.stats.get_link_stats(link_id, StatsWindow::default()).await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));

    let result = state
        .stats
        .get_link_stats_by_code("missing", StatsWindow::default())
        .await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_dashboard_truncates_to_limit_and_sums_everything() {
    let db = common::test_db().await;
    let state = common::test_state(&db);

    let mut expected_total = 0;
    for clicks in 1..=15usize {
        let id = common::create_test_link(
            &db.pool,
            &format!("link{clicks:02}"),
            &format!("https://example.com/{clicks}"),
        )
        .await;
        common::record_visits(&db.pool, id, "", Utc::now(), clicks).await;
        expected_total += clicks as i64;
    }

    let dashboard = state
        .stats
        .get_dashboard(DashboardQuery {
            limit: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(dashboard.links.len(), 10);
    assert_eq!(dashboard.total_clicks, expected_total);
    assert_eq!(dashboard.links[0].clicks, 15);
    assert_eq!(dashboard.links[9].clicks, 6);
    assert!(dashboard.links.windows(2).all(|w| w[0].clicks > w[1].clicks));

    let defaulted = state
        .stats
        .get_dashboard(DashboardQuery {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(defaulted.links.len(), 10);
}

#[tokio::test]
async fn test_dashboard_tag_filter() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let only_a = common::create_tagged_link(&db.pool, "a", "https://a.com/", "", &["a"]).await;
    common::create_tagged_link(&db.pool, "b", "https://b.com/", "", &["b"]).await;
    let both = common::create_tagged_link(&db.pool, "ab", "https://ab.com/", "", &["a", "b"]).await;

    let dashboard = state
        .stats
        .get_dashboard(DashboardQuery {
            limit: None,
            filter: LinkFilter {
                tag: Some("a".to_string()),
                ..Default::default()
            },
        })
        .await
        .unwrap();

    let mut ids: Vec<i64> = dashboard.links.iter().map(|l| l.id).collect();
    ids.sort();
    assert_eq!(ids, vec![only_a, both]);
}

#[tokio::test]
async fn test_dashboard_filters_compose() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    common::create_tagged_link(&db.pool, "gh1", "https://github.com/rust", "Rust repo", &["code"]).await;
    common::create_tagged_link(&db.pool, "gh2", "https://github.com/go", "Go repo", &["code"]).await;
    common::create_tagged_link(&db.pool, "blog", "https://blog.rust.dev/", "Rust blog", &["code"]).await;

    let dashboard = state
        .stats
        .get_dashboard(DashboardQuery {
            limit: Some(10),
            filter: LinkFilter {
                search: Some("rust".to_string()),
                tag: Some("code".to_string()),
                url_contains: Some("github.com".to_string()),
            },
        })
        .await
        .unwrap();

    assert_eq!(dashboard.links.len(), 1);
    assert_eq!(dashboard.links[0].short_code, "gh1");
}

#[tokio::test]
async fn test_dashboard_excludes_deleted_links_everywhere() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let live = common::create_test_link(&db.pool, "live", "https://a.com/").await;
    let gone = common::create_test_link(&db.pool, "gone", "https://b.com/").await;
    common::record_visits(&db.pool, live, "", Utc::now(), 2).await;
    common::record_visits(&db.pool, gone, "", Utc::now(), 7).await;
    common::soft_delete_link(&db.pool, gone).await;

    let dashboard = state
        .stats
        .get_dashboard(DashboardQuery::default())
        .await
        .unwrap();

    assert_eq!(dashboard.total_clicks, 2);
    assert_eq!(dashboard.links.len(), 1);
    assert_eq!(dashboard.links[0].id, live);
}

#[tokio::test]
async fn test_dashboard_ties_keep_creation_order() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let first = common::create_test_link(&db.pool, "first", "https://a.com/").await;
    let second = common::create_test_link(&db.pool, "second", "https://b.com/").await;
    let third = common::create_test_link(&db.pool, "third", "https://c.com/").await;
    for id in [third, first, second] {
        common::record_visits(&db.pool, id, "", Utc::now(), 1).await;
    }

    for _ in 0..3 {
        let dashboard = state
            .stats
            .get_dashboard(DashboardQuery::default())
            .await
            .unwrap();
        let ids: Vec<i64> = dashboard.links.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }
}
