//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL with its click counter
//! - [`Visit`] - One recorded redirect, append-only
//! - [`Collection`] - An ordered group of links
//!
//! Separate input structs (`NewLink`, `NewVisit`, `NewCollection`) are used
//! for creation, and `LinkPatch` / `CollectionUpdate` for edits.

pub mod collection;
pub mod link;
pub mod visit;

pub use collection::{Collection, CollectionUpdate, NewCollection};
pub use link::{Link, LinkFilter, LinkPatch, NewLink};
pub use visit::{
    DIRECT_REFERRER, DailyCount, NewVisit, ReferrerCount, StatsWindow, Visit, end_of_day,
    start_of_day,
};
