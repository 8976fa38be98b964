//! # Clicktrail
//!
//! A URL shortener core backed by SQLite: short links, transactional click
//! analytics, a click-ranked dashboard and ordered link collections.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Core entities, repository traits and the visit pipeline
//! - **Application Layer** ([`application`]) - Business logic and service orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - SQLite repositories and migrations
//!
//! The request layer (HTTP routing, authentication) is not part of this
//! crate. It resolves a short code with [`application::services::LinkService`],
//! answers the client and pushes a [`domain::visit_event::VisitEvent`] into a
//! [`domain::visit_worker::VisitQueue`].
//!
//! ## Visit accounting
//!
//! Every recorded visit appends one row to the visit log and increments the
//! link's click counter in the same transaction, so for every link
//! `clicks == count(visits)` holds at all times.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::pagination::{PageRequest, Paginated};
    pub use crate::application::services::{
        CollectionService, Dashboard, DashboardQuery, LinkService, LinkStats, ShortenRequest,
        StatsService, TransferService, VisitRecorder,
    };
    pub use crate::domain::entities::{
        Collection, Link, LinkFilter, LinkPatch, NewLink, StatsWindow, Visit,
    };
    pub use crate::domain::visit_event::VisitEvent;
    pub use crate::domain::visit_worker::{VisitQueue, VisitWorker, WorkerOptions};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
