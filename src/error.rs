//! Application error type shared by every layer.
//!
//! Storage errors from `sqlx` are converted through [`From<sqlx::Error>`], so
//! repository code can use `?` directly on queries.

use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input that cannot be normalized to a sensible default.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The referenced record does not exist (or is soft-deleted).
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// A uniqueness constraint would be violated.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// The underlying persistence operation failed.
    #[error("{message}")]
    Storage { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }

    /// Short machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::Storage { .. } => "storage_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::Storage { details, .. } => details,
        }
    }

    /// Only storage failures (busy database, dropped connection) are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Storage { .. })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": db.constraint(), "reason": db.message() }),
                );
            }
            if db.is_foreign_key_violation() {
                return AppError::not_found(
                    "Referenced record does not exist",
                    json!({ "reason": db.message() }),
                );
            }
        }

        if matches!(e, sqlx::Error::RowNotFound) {
            return AppError::not_found("Record not found", json!({}));
        }

        AppError::storage("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::storage("Migration failed", json!({ "reason": e.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::bad_request("x", json!({})).code(),
            "validation_error"
        );
        assert_eq!(AppError::not_found("x", json!({})).code(), "not_found");
        assert_eq!(AppError::conflict("x", json!({})).code(), "conflict");
        assert_eq!(AppError::storage("x", json!({})).code(), "storage_error");
    }

    #[test]
    fn test_display_uses_message() {
        let err = AppError::not_found("Link not found", json!({ "id": 7 }));
        assert_eq!(err.to_string(), "Link not found");
        assert_eq!(err.details()["id"], 7);
    }

    #[test]
    fn test_only_storage_is_retryable() {
        assert!(AppError::storage("busy", json!({})).is_retryable());
        assert!(!AppError::not_found("gone", json!({})).is_retryable());
        assert!(!AppError::conflict("dup", json!({})).is_retryable());
        assert!(!AppError::bad_request("bad", json!({})).is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_pool_timeout_maps_to_storage() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Storage { .. }));
        assert!(err.is_retryable());
    }
}
