//! Business logic services for the application layer.

pub mod collection_service;
pub mod link_service;
pub mod stats_service;
pub mod transfer_service;
pub mod visit_recorder;

pub use collection_service::CollectionService;
pub use link_service::{LinkService, ShortenRequest, short_url};
pub use stats_service::{Dashboard, DashboardQuery, LinkStats, StatsService};
pub use transfer_service::{ImportReport, LinkRecord, TransferService};
pub use visit_recorder::VisitRecorder;
