//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented in `crate::infrastructure::persistence`. Mock implementations
//! are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link store: CRUD, listing, click ranking
//! - [`VisitRepository`] - Visit log: transactional recording and aggregation
//! - [`CollectionRepository`] - Link collections and their ordering
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod collection_repository;
pub mod link_repository;
pub mod visit_repository;

pub use collection_repository::CollectionRepository;
pub use link_repository::LinkRepository;
pub use visit_repository::VisitRepository;

#[cfg(test)]
pub use collection_repository::MockCollectionRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
