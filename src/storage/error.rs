//! Closed storage-error taxonomy and the error classifier.
//!
//! Every failure crossing the retry/fallback layer is classified into
//! [`StorageErrorCode`] — a closed set extended only by adding new codes,
//! never by reusing one for a different meaning. Each code carries a
//! stable, user-facing message; raw provider text is preserved in
//! `details` for logs and never shown to end users.

use std::fmt;
use std::time::SystemTime;

use crate::MuninnError;

/// Closed error code set for classified failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorCode {
    NetworkError,
    TimeoutError,
    ConnectionFailed,
    FileTooLarge,
    InvalidFileType,
    CorruptedFile,
    FileNotFound,
    BucketNotFound,
    InsufficientPermissions,
    StorageQuotaExceeded,
    UploadFailed,
    InvalidCredentials,
    TokenExpired,
    Unauthorized,
    InvalidConfig,
    MissingEnvironment,
    ValidationError,
    UnknownError,
}

impl StorageErrorCode {
    /// Wire-stable SCREAMING_SNAKE_CASE name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::ConnectionFailed => "CONNECTION_FAILED",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::InvalidFileType => "INVALID_FILE_TYPE",
            Self::CorruptedFile => "CORRUPTED_FILE",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::BucketNotFound => "BUCKET_NOT_FOUND",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::StorageQuotaExceeded => "STORAGE_QUOTA_EXCEEDED",
            Self::UploadFailed => "UPLOAD_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::MissingEnvironment => "MISSING_ENVIRONMENT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Whether failures with this code are worth retrying.
    ///
    /// Only transport-level conditions qualify; everything else reflects
    /// bad input or configuration that will not change between attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::TimeoutError | Self::ConnectionFailed | Self::UploadFailed
        )
    }

    /// Stable, human-readable message for this code.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NetworkError => "A network error occurred. Please try again.",
            Self::TimeoutError => "The operation timed out. Please try again.",
            Self::ConnectionFailed => "Could not connect to the storage service.",
            Self::FileTooLarge => "The file is too large to store.",
            Self::InvalidFileType => "This file type is not supported.",
            Self::CorruptedFile => "The file appears to be corrupted.",
            Self::FileNotFound => "The requested file could not be found.",
            Self::BucketNotFound => "The storage location does not exist.",
            Self::InsufficientPermissions => "You do not have permission to perform this action.",
            Self::StorageQuotaExceeded => "Storage quota has been exceeded.",
            Self::UploadFailed => "The upload failed. Please try again.",
            Self::InvalidCredentials => "Storage credentials are invalid.",
            Self::TokenExpired => "Your session has expired. Please sign in again.",
            Self::Unauthorized => "You are not authorized to perform this action.",
            Self::InvalidConfig => "The storage service is misconfigured.",
            Self::MissingEnvironment => "A required configuration value is missing.",
            Self::ValidationError => "The request failed validation.",
            Self::UnknownError => "An unexpected error occurred.",
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure. Immutable once created.
///
/// `message` is the stable user-facing text for the code; the raw error
/// text lives in `details` and is intended for logs only.
#[derive(Debug, Clone)]
pub struct StorageError {
    pub code: StorageErrorCode,
    /// Stable user-facing message (from the code table).
    pub message: String,
    /// Operation that failed (e.g. `"upload-primary"`, `"poll"`).
    pub operation: String,
    pub retryable: bool,
    pub timestamp: SystemTime,
    /// Raw provider/transport error text, preserved for logs.
    pub details: String,
}

impl StorageError {
    /// Create a classified error for an operation.
    pub fn new(code: StorageErrorCode, operation: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: code.user_message().to_string(),
            operation: operation.into(),
            retryable: code.is_retryable(),
            timestamp: SystemTime::now(),
            details: details.into(),
        }
    }
}

/// Shows code + operation + stable message, never raw details.
impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.code, self.message, self.operation)
    }
}

/// Classify an error into the closed taxonomy.
///
/// Ordered pattern matching: structured variants first, HTTP status codes
/// second, message-content keywords as a last resort. Every classified
/// error gets a `retryable` flag derived from its code.
pub fn classify(err: &MuninnError, operation: &str) -> StorageError {
    // Already-classified errors pass through with the original operation
    // preserved; re-wrapping would lose the first classification.
    if let MuninnError::Storage(inner) = err {
        return inner.clone();
    }

    let code = match err {
        MuninnError::Timeout { .. } => StorageErrorCode::TimeoutError,
        MuninnError::Validation(_) | MuninnError::ModelNotFound(_) => {
            StorageErrorCode::ValidationError
        }
        MuninnError::Configuration(_) => StorageErrorCode::InvalidConfig,
        MuninnError::Json(_) => StorageErrorCode::CorruptedFile,
        MuninnError::NoAssets | MuninnError::JobFailed { .. } | MuninnError::Canceled { .. } => {
            StorageErrorCode::UnknownError
        }
        MuninnError::Api { status, message } => classify_status(*status, message),
        MuninnError::Http(message) => classify_message(message, StorageErrorCode::NetworkError),
        MuninnError::Storage(_) => unreachable!("handled above"),
    };

    StorageError::new(code, operation, err.to_string())
}

/// Map an HTTP status to a code, consulting the message for ambiguity.
fn classify_status(status: u16, message: &str) -> StorageErrorCode {
    match status {
        400 | 422 => StorageErrorCode::ValidationError,
        401 => {
            let lower = message.to_ascii_lowercase();
            if lower.contains("expired") {
                StorageErrorCode::TokenExpired
            } else if lower.contains("credential") || lower.contains("api key") {
                StorageErrorCode::InvalidCredentials
            } else {
                StorageErrorCode::Unauthorized
            }
        }
        403 => StorageErrorCode::InsufficientPermissions,
        404 => {
            if message.to_ascii_lowercase().contains("bucket") {
                StorageErrorCode::BucketNotFound
            } else {
                StorageErrorCode::FileNotFound
            }
        }
        408 => StorageErrorCode::TimeoutError,
        413 => StorageErrorCode::FileTooLarge,
        415 => StorageErrorCode::InvalidFileType,
        507 => StorageErrorCode::StorageQuotaExceeded,
        s if s >= 500 => StorageErrorCode::UploadFailed,
        429 => StorageErrorCode::NetworkError,
        _ => classify_message(message, StorageErrorCode::UnknownError),
    }
}

/// Keyword matching over the raw message. Last resort only; order matters,
/// the most specific patterns come first.
fn classify_message(message: &str, default: StorageErrorCode) -> StorageErrorCode {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        StorageErrorCode::TimeoutError
    } else if lower.contains("quota") {
        StorageErrorCode::StorageQuotaExceeded
    } else if lower.contains("bucket") {
        StorageErrorCode::BucketNotFound
    } else if lower.contains("too large") || lower.contains("payload size") {
        StorageErrorCode::FileTooLarge
    } else if lower.contains("corrupt") {
        StorageErrorCode::CorruptedFile
    } else if lower.contains("token") && lower.contains("expired") {
        StorageErrorCode::TokenExpired
    } else if lower.contains("credential") || lower.contains("api key") {
        StorageErrorCode::InvalidCredentials
    } else if lower.contains("permission") || lower.contains("access denied") {
        StorageErrorCode::InsufficientPermissions
    } else if lower.contains("unauthorized") || lower.contains("unauthenticated") {
        StorageErrorCode::Unauthorized
    } else if lower.contains("not found") {
        StorageErrorCode::FileNotFound
    } else if lower.contains("unsupported type") || lower.contains("invalid type") {
        StorageErrorCode::InvalidFileType
    } else if lower.contains("missing environment") || lower.contains("env var") {
        StorageErrorCode::MissingEnvironment
    } else if lower.contains("config") {
        StorageErrorCode::InvalidConfig
    } else if lower.contains("connection") || lower.contains("connect") || lower.contains("refused")
    {
        StorageErrorCode::ConnectionFailed
    } else if lower.contains("upload") {
        StorageErrorCode::UploadFailed
    } else if lower.contains("network") || lower.contains("dns") {
        StorageErrorCode::NetworkError
    } else {
        default
    }
}
