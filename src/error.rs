//! Muninn error types

use std::time::Duration;

use crate::request::ValidationError;
use crate::storage::StorageError;

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum MuninnError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Request shaping errors
    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("validation failed: {}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    // Job lifecycle errors
    #[error("timed out after {waited:?} waiting for terminal state")]
    Timeout { waited: Duration },

    #[error("prediction {id} failed: {message}")]
    JobFailed { id: String, message: String },

    #[error("prediction {id} was canceled")]
    Canceled { id: String },

    /// The provider reported success but its output contained no asset URLs.
    #[error("no assets produced")]
    NoAssets,

    // Persistence errors (already classified)
    #[error("storage error: {0}")]
    Storage(StorageError),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MuninnError {
    /// Whether this error is transient and worth retrying.
    ///
    /// Mirrors the retryable subset of the storage error taxonomy:
    /// network failures, timeouts, connection failures, and failed
    /// uploads. Validation and configuration errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } => true,
            // 4xx responses are input/configuration errors; 408/429 and
            // 5xx are provider-side conditions that may clear.
            Self::Api { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Storage(e) => e.retryable,
            _ => false,
        }
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for Muninn operations
pub type Result<T> = std::result::Result<T, MuninnError>;
