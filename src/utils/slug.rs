//! Collection slug validation.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

pub const MAX_SLUG_LENGTH: usize = 64;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap_or_else(|e| panic!("invalid slug regex: {e}"))
});

/// Validates a collection slug: lowercase letters and digits separated by
/// single hyphens, at most 64 characters.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when the slug is empty or malformed.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() {
        return Err(AppError::bad_request("Slug is required", json!({})));
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(AppError::bad_request(
            format!("Slug must be at most {MAX_SLUG_LENGTH} characters"),
            json!({ "provided_length": slug.len() }),
        ));
    }

    if !SLUG_RE.is_match(slug) {
        return Err(AppError::bad_request(
            "Slug can only contain lowercase letters, digits and single hyphens",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(validate_slug("my-links").is_ok());
        assert!(validate_slug("bio2025").is_ok());
        assert!(validate_slug("a").is_ok());
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug("My-Links").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("with space").is_err());
        assert!(validate_slug(&"a".repeat(65)).is_err());
    }
}
