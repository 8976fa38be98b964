//! Short code generation and validation utilities.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

pub const MIN_CUSTOM_CODE_LENGTH: usize = 3;
pub const MAX_CUSTOM_CODE_LENGTH: usize = 32;

/// Reserved codes that cannot be used as short links.
///
/// These collide with well-known paths served next to short links.
const RESERVED_CODES: &[&str] = &[
    "api",
    "admin",
    "auth",
    "dashboard",
    "health",
    "login",
    "logout",
    "stats",
    "static",
    "c",
];

static CUSTOM_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").unwrap_or_else(|e| panic!("invalid code regex: {e}"))
});

/// Generates a random alphanumeric short code of `length` characters.
///
/// Uses the thread-local CSPRNG from `rand`.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved system code (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < MIN_CUSTOM_CODE_LENGTH || code.len() > MAX_CUSTOM_CODE_LENGTH {
        return Err(AppError::bad_request(
            format!(
                "Custom code must be {}-{} characters",
                MIN_CUSTOM_CODE_LENGTH, MAX_CUSTOM_CODE_LENGTH
            ),
            json!({ "provided_length": code.len() }),
        ));
    }

    if !CUSTOM_CODE_RE.is_match(code) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, hyphens and underscores",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
    {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
