//! Background visit recording.
//!
//! The redirect path pushes [`VisitEvent`]s into a bounded [`VisitQueue`]
//! and returns immediately. A [`VisitWorker`] task drains the queue with
//! bounded concurrency and records each event through a [`VisitSink`],
//! retrying storage failures with exponential backoff.
//!
//! The worker owns its own task, so recording is never cancelled together
//! with the request that produced the event. Shutdown is explicit: drop every
//! queue handle, then await [`VisitWorker::drain`], which finishes in-flight
//! writes and returns a [`WorkerReport`]. Events still queued when the process
//! dies without draining are lost; counters and the visit log stay consistent
//! because each write is a single transaction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::entities::Visit;
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;

/// Destination of queued visits, implemented by the visit recorder.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitSink: Send + Sync {
    async fn record(&self, event: VisitEvent) -> Result<Visit, AppError>;
}

/// Tuning knobs for the queue and worker.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub queue_capacity: usize,
    pub concurrency: usize,
    /// Extra attempts after the first failed write.
    pub retry_attempts: usize,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_base_delay: Duration,
    /// Buffered failures kept for an observer; new failures are dropped when full.
    pub failure_capacity: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 10_000,
            concurrency: 4,
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(50),
            failure_capacity: 1_000,
        }
    }
}

impl WorkerOptions {
    fn retry_strategy(&self) -> impl Iterator<Item = Duration> + use<> {
        let base_ms = u64::try_from(self.retry_base_delay.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);

        ExponentialBackoff::from_millis(2)
            .factor(base_ms / 2 + 1)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(self.retry_attempts)
    }
}

/// A visit that could not be recorded, even after retries.
#[derive(Debug)]
pub struct VisitFailure {
    pub event: VisitEvent,
    pub error: AppError,
}

/// Outcome counters returned when the worker stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub recorded: u64,
    pub failed: u64,
}

impl WorkerReport {
    fn absorb(&mut self, result: Result<bool, JoinError>) {
        match result {
            Ok(true) => self.recorded += 1,
            Ok(false) => self.failed += 1,
            Err(e) => {
                error!("Visit task panicked: {}", e);
                self.failed += 1;
            }
        }
    }
}

/// Cloneable, non-blocking handle for enqueueing visits.
#[derive(Debug, Clone)]
pub struct VisitQueue {
    sender: mpsc::Sender<VisitEvent>,
}

impl VisitQueue {
    /// Queues a visit without waiting.
    ///
    /// Returns `false` when the event was dropped because the queue is full
    /// or the worker has stopped.
    pub fn enqueue(&self, event: VisitEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(link_id = event.link_id, "Visit queue full, dropping visit");
                metrics::counter!("visits_dropped_total").increment(1);
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(link_id = event.link_id, "Visit worker stopped, dropping visit");
                metrics::counter!("visits_dropped_total").increment(1);
                false
            }
        }
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Handle on the running worker task.
pub struct VisitWorker {
    handle: JoinHandle<WorkerReport>,
    failures: Option<mpsc::Receiver<VisitFailure>>,
}

impl VisitWorker {
    /// Takes the failure channel. Only the first call returns `Some`.
    pub fn take_failures(&mut self) -> Option<mpsc::Receiver<VisitFailure>> {
        self.failures.take()
    }

    /// Waits until every queue handle is dropped and all queued visits are written.
    pub async fn drain(self) -> WorkerReport {
        match self.handle.await {
            Ok(report) => report,
            Err(e) => {
                error!("Visit worker terminated abnormally: {}", e);
                WorkerReport::default()
            }
        }
    }
}

/// Spawns the visit worker on the current tokio runtime.
pub fn spawn_visit_worker<S>(sink: Arc<S>, options: WorkerOptions) -> (VisitQueue, VisitWorker)
where
    S: VisitSink + ?Sized + 'static,
{
    let (sender, receiver) = mpsc::channel(options.queue_capacity.max(1));
    let (failure_tx, failure_rx) = mpsc::channel(options.failure_capacity.max(1));

    let handle = tokio::spawn(run_visit_worker(receiver, sink, options, failure_tx));

    (
        VisitQueue { sender },
        VisitWorker {
            handle,
            failures: Some(failure_rx),
        },
    )
}

/// Drains `rx` until it is closed, recording each event through `sink`.
pub async fn run_visit_worker<S>(
    mut rx: mpsc::Receiver<VisitEvent>,
    sink: Arc<S>,
    options: WorkerOptions,
    failures: mpsc::Sender<VisitFailure>,
) -> WorkerReport
where
    S: VisitSink + ?Sized + 'static,
{
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut report = WorkerReport::default();

    info!(
        concurrency = options.concurrency,
        capacity = options.queue_capacity,
        "Visit worker started"
    );

    while let Some(event) = rx.recv().await {
        while let Some(result) = tasks.try_join_next() {
            report.absorb(result);
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let sink = sink.clone();
        let failures = failures.clone();
        let strategy = options.retry_strategy();

        tasks.spawn(async move {
            let _permit = permit;
            record_with_retry(sink.as_ref(), event, strategy, &failures).await
        });
    }

    while let Some(result) = tasks.join_next().await {
        report.absorb(result);
    }

    info!(
        recorded = report.recorded,
        failed = report.failed,
        "Visit worker drained"
    );

    report
}

async fn record_with_retry<S>(
    sink: &S,
    event: VisitEvent,
    strategy: impl Iterator<Item = Duration>,
    failures: &mpsc::Sender<VisitFailure>,
) -> bool
where
    S: VisitSink + ?Sized,
{
    let result = RetryIf::spawn(
        strategy,
        || sink.record(event.clone()),
        |e: &AppError| {
            if e.is_retryable() {
                debug!(link_id = event.link_id, "Retrying visit write: {}", e);
            }
            e.is_retryable()
        },
    )
    .await;

    match result {
        Ok(visit) => {
            debug!(link_id = visit.link_id, visit_id = visit.id, "Visit recorded");
            metrics::counter!("visits_recorded_total").increment(1);
            true
        }
        Err(error) => {
            warn!(
                link_id = event.link_id,
                code = error.code(),
                "Failed to record visit: {}",
                error
            );
            metrics::counter!("visits_failed_total").increment(1);
            let _ = failures.try_send(VisitFailure { event, error });
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn visit_for(event: &VisitEvent) -> Visit {
        Visit {
            id: 1,
            link_id: event.link_id,
            referrer: String::new(),
            user_agent: String::new(),
            ip_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn fast_options() -> WorkerOptions {
        WorkerOptions {
            queue_capacity: 100,
            concurrency: 4,
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(1),
            failure_capacity: 10,
        }
    }

    #[tokio::test]
    async fn test_worker_records_every_queued_visit() {
        let mut sink = MockVisitSink::new();
        sink.expect_record()
            .times(20)
            .returning(|event| Ok(visit_for(&event)));

        let (queue, worker) = spawn_visit_worker(Arc::new(sink), fast_options());

        for i in 0..20 {
            assert!(queue.enqueue(VisitEvent::new(i, None, None, None)));
        }
        drop(queue);

        let report = worker.drain().await;
        assert_eq!(report, WorkerReport { recorded: 20, failed: 0 });
    }

    #[tokio::test]
    async fn test_worker_retries_storage_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut sink = MockVisitSink::new();
        sink.expect_record().returning(move |event| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::storage("database is locked", json!({})))
            } else {
                Ok(visit_for(&event))
            }
        });

        let (queue, worker) = spawn_visit_worker(Arc::new(sink), fast_options());
        assert!(queue.enqueue(VisitEvent::new(1, None, None, None)));
        drop(queue);

        let report = worker.drain().await;
        assert_eq!(report.recorded, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_worker_does_not_retry_not_found() {
        let mut sink = MockVisitSink::new();
        sink.expect_record()
            .times(1)
            .returning(|_| Err(AppError::not_found("Link not found", json!({}))));

        let (queue, mut worker) = spawn_visit_worker(Arc::new(sink), fast_options());
        let mut failures = worker.take_failures().unwrap();

        assert!(queue.enqueue(VisitEvent::new(99, None, None, None)));
        drop(queue);

        let report = worker.drain().await;
        assert_eq!(report, WorkerReport { recorded: 0, failed: 1 });

        let failure = failures.recv().await.unwrap();
        assert_eq!(failure.event.link_id, 99);
        assert!(matches!(failure.error, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_retry_budget() {
        let mut sink = MockVisitSink::new();
        sink.expect_record()
            .times(4)
            .returning(|_| Err(AppError::storage("disk I/O error", json!({}))));

        let (queue, worker) = spawn_visit_worker(Arc::new(sink), fast_options());
        assert!(queue.enqueue(VisitEvent::new(5, None, None, None)));
        drop(queue);

        let report = worker.drain().await;
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_full_failure_buffer_keeps_earliest_failures() {
        let mut sink = MockVisitSink::new();
        sink.expect_record()
            .times(2)
            .returning(|_| Err(AppError::not_found("Link not found", json!({}))));

        let options = WorkerOptions {
            concurrency: 1,
            failure_capacity: 1,
            ..fast_options()
        };
        let (queue, mut worker) = spawn_visit_worker(Arc::new(sink), options);
        let mut failures = worker.take_failures().unwrap();

        assert!(queue.enqueue(VisitEvent::new(1, None, None, None)));
        assert!(queue.enqueue(VisitEvent::new(2, None, None, None)));
        drop(queue);

        let report = worker.drain().await;
        assert_eq!(report, WorkerReport { recorded: 0, failed: 2 });

        assert_eq!(failures.recv().await.unwrap().event.link_id, 1);
        assert!(failures.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_enqueue_drops_when_queue_is_full() {
        let (sender, _receiver) = mpsc::channel(1);
        let queue = VisitQueue { sender };

        assert!(queue.enqueue(VisitEvent::new(1, None, None, None)));
        assert!(!queue.enqueue(VisitEvent::new(2, None, None, None)));
        assert_eq!(queue.capacity(), 0);
    }

    #[tokio::test]
    async fn test_enqueue_drops_when_worker_stopped() {
        let (sender, receiver) = mpsc::channel(4);
        drop(receiver);
        let queue = VisitQueue { sender };

        assert!(queue.is_closed());
        assert!(!queue.enqueue(VisitEvent::new(1, None, None, None)));
    }

    #[test]
    fn test_retry_strategy_respects_attempts() {
        let options = WorkerOptions {
            retry_attempts: 2,
            ..fast_options()
        };
        assert_eq!(options.retry_strategy().count(), 2);

        let none = WorkerOptions {
            retry_attempts: 0,
            ..fast_options()
        };
        assert_eq!(none.retry_strategy().count(), 0);
    }
}
