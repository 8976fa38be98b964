//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and are
//! driven by the CLI or by an embedding request layer.
//!
//! # Available Services
//!
//! - [`services::LinkService`] - Short link creation, lookup and lifecycle
//! - [`services::VisitRecorder`] - Transactional visit recording
//! - [`services::StatsService`] - Per-link stats and the dashboard ranking
//! - [`services::CollectionService`] - Ordered link collections
//! - [`services::TransferService`] - JSON export and import

pub mod pagination;
pub mod services;
