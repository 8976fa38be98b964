mod common;

use clicktrail::domain::entities::StatsWindow;
use clicktrail::domain::visit_event::VisitEvent;
use clicktrail::error::AppError;
use clicktrail::utils::ip_hash::anonymize_ip;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queued_visits_are_all_recorded_after_drain() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let link = state
        .links
        .shorten(clicktrail::application::services::ShortenRequest {
            original_url: "https://example.com/landing".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let (queue, worker) = state.spawn_visit_worker();
    for i in 0..100 {
        let resolved = state.links.resolve(&link.short_code).await.unwrap();
        let referrer = if i % 2 == 0 { None } else { Some("https://t.co") };
        assert!(queue.enqueue(VisitEvent::new(
            resolved.id,
            referrer,
            Some("Mozilla/5.0"),
            Some(format!("10.0.0.{}", i % 7)),
        )));
    }
    drop(queue);

    let report = worker.drain().await;
    assert_eq!(report.recorded, 100);
    assert_eq!(report.failed, 0);

    assert_eq!(common::clicks_of(&db.pool, link.id).await, 100);
    assert_eq!(common::visits_of(&db.pool, link.id).await, 100);

    let stats = state
        .stats
        .get_link_stats(link.id, StatsWindow::default())
        .await
        .unwrap();
    assert_eq!(stats.total_clicks, 100);
    assert_eq!(stats.referrers.len(), 2);
    assert!(stats.referrers.iter().all(|r| r.count == 50));
}

#[tokio::test]
async fn test_recorded_identity_is_salted_hash() {
    let db = common::test_db().await;
    let state = common::test_state(&db);
    let link_id = common::create_test_link(&db.pool, "ip", "https://example.com/").await;

    let visit = state
        .recorder
        .record_visit(VisitEvent::new(
            link_id,
            Some(" https://google.com "),
            None,
            Some("203.0.113.9".to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(visit.referrer, "https://google.com");
    assert_eq!(visit.user_agent, "");
    assert_eq!(visit.ip_hash, anonymize_ip(Some("203.0.113.9"), "test-salt"));
}

#[tokio::test]
async fn test_failed_visit_reaches_failure_channel() {
    let db = common::test_db().await;
    let state = common::test_state(&db);

    let (queue, mut worker) = state.spawn_visit_worker();
    let mut failures = worker.take_failures().unwrap();

    assert!(queue.enqueue(VisitEvent::new(777, None, None, None)));
    drop(queue);

    let report = worker.drain().await;
    assert_eq!(report.recorded, 0);
    assert_eq!(report.failed, 1);

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.event.link_id, 777);
    assert!(matches!(failure.error, AppError::NotFound { .. }));
}
