//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces, and the visit pipeline
//! independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`visit_event`] - Queued visit model
//! - [`visit_worker`] - Asynchronous visit recording worker
//!
//! # Visit Processing Flow
//!
//! 1. The caller resolves a short code to a link
//! 2. A [`visit_event::VisitEvent`] is pushed to [`visit_worker::VisitQueue`]
//! 3. [`visit_worker::run_visit_worker`] records it with retry logic
//! 4. The recorder appends the visit and bumps the counter in one
//!    transaction via [`repositories::VisitRepository::record`]

pub mod entities;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
