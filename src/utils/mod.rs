//! Helper functions used across the application.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_normalizer`] - URL normalization and sanitization
//! - [`ip_hash`] - Caller IP anonymization
//! - [`slug`] - Collection slug validation

pub mod code_generator;
pub mod ip_hash;
pub mod slug;
pub mod url_normalizer;
