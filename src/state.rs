//! Wiring of repositories and services over one SQLite pool.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::application::services::{
    CollectionService, LinkService, StatsService, TransferService, VisitRecorder,
};
use crate::config::Config;
use crate::domain::visit_worker::{VisitQueue, VisitWorker, WorkerOptions, spawn_visit_worker};
use crate::infrastructure::persistence::{
    SqliteCollectionRepository, SqliteLinkRepository, SqliteVisitRepository,
};

pub type Links = LinkService<SqliteLinkRepository>;
pub type Stats = StatsService<SqliteLinkRepository, SqliteVisitRepository>;
pub type Collections = CollectionService<SqliteCollectionRepository, SqliteLinkRepository>;
pub type Transfer = TransferService<SqliteLinkRepository>;
pub type Recorder = VisitRecorder<SqliteVisitRepository>;

/// Services shared by every command, built once per process.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub base_url: String,
    pub links: Arc<Links>,
    pub stats: Arc<Stats>,
    pub collections: Arc<Collections>,
    pub transfer: Arc<Transfer>,
    pub recorder: Arc<Recorder>,
    worker_options: WorkerOptions,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        let db = Arc::new(db);
        let link_repository = Arc::new(SqliteLinkRepository::new(db.clone()));
        let visit_repository = Arc::new(SqliteVisitRepository::new(db.clone()));
        let collection_repository = Arc::new(SqliteCollectionRepository::new(db.clone()));

        Self {
            base_url: config.base_url.clone(),
            links: Arc::new(LinkService::new(
                link_repository.clone(),
                config.short_code_length,
            )),
            stats: Arc::new(StatsService::new(
                link_repository.clone(),
                visit_repository.clone(),
            )),
            collections: Arc::new(CollectionService::new(
                collection_repository,
                link_repository.clone(),
            )),
            transfer: Arc::new(TransferService::new(link_repository)),
            recorder: Arc::new(VisitRecorder::new(
                visit_repository,
                config.ip_hash_salt.clone(),
            )),
            worker_options: worker_options(config),
            db,
        }
    }

    /// Starts a background visit worker feeding the shared recorder.
    pub fn spawn_visit_worker(&self) -> (VisitQueue, VisitWorker) {
        spawn_visit_worker(self.recorder.clone(), self.worker_options.clone())
    }
}

/// Worker tuning derived from configuration.
pub fn worker_options(config: &Config) -> WorkerOptions {
    WorkerOptions {
        queue_capacity: config.visit_queue_capacity,
        concurrency: config.visit_worker_concurrency,
        retry_attempts: config.visit_retry_attempts,
        retry_base_delay: Duration::from_millis(50),
        ..WorkerOptions::default()
    }
}
