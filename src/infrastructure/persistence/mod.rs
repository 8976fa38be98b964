//! SQLite repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries against a single SQLite database.
//!
//! # Repositories
//!
//! - [`SqliteLinkRepository`] - Link storage, listing and click ranking
//! - [`SqliteVisitRepository`] - Transactional visit recording and aggregation
//! - [`SqliteCollectionRepository`] - Collections and their ordered members

pub mod database;
mod rows;
pub mod sqlite_collection_repository;
pub mod sqlite_link_repository;
pub mod sqlite_visit_repository;

pub use database::{PoolSettings, connect, migrate};
pub use sqlite_collection_repository::SqliteCollectionRepository;
pub use sqlite_link_repository::SqliteLinkRepository;
pub use sqlite_visit_repository::SqliteVisitRepository;
