//! Error types module
//!
//! This module provides the core error types used throughout Marquee.
//! All errors are unified under the `AppError` enum which can represent database,
//! staging-provider, validation, and ingestion-specific errors.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::models::FieldError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like provider outages
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Staging request rejected by provider ({} field error(s))", .0.len())]
    ProviderRejected(Vec<FieldError>),

    #[error("Staging provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Binary upload failed: {0}")]
    UploadFailed(String),

    #[error("Finalize failed: {0}")]
    FinalizeFailed(String),

    #[error("Remote object {remote_url} created but metadata write failed: {message}")]
    IngestionInconsistent { remote_url: String, message: String },

    #[error("Ingestion deadline exceeded during {0}")]
    IngestionTimeout(String),
}

// Error conversion implementations
#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check API key or authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::ProviderRejected(_) => (
            400,
            "PROVIDER_REJECTED",
            false,
            Some("Fix the fields reported by the storage provider"),
            false,
            LogLevel::Debug,
        ),
        AppError::ProviderUnavailable(_)
        | AppError::UploadFailed(_)
        | AppError::FinalizeFailed(_) => (
            502,
            "INGESTION_FAILED",
            true,
            Some("Retry the upload after a short delay"),
            true,
            LogLevel::Warn,
        ),
        AppError::IngestionInconsistent { .. } => (
            500,
            "INGESTION_INCONSISTENT",
            false,
            Some("Contact an operator to reconcile the orphaned remote file"),
            true,
            LogLevel::Error,
        ),
        AppError::IngestionTimeout(_) => (
            504,
            "INGESTION_TIMEOUT",
            true,
            Some("Retry the upload, possibly with a smaller file"),
            false,
            LogLevel::Warn,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::ProviderRejected(_) => "ProviderRejected",
            AppError::ProviderUnavailable(_) => "ProviderUnavailable",
            AppError::UploadFailed(_) => "UploadFailed",
            AppError::FinalizeFailed(_) => "FinalizeFailed",
            AppError::IngestionInconsistent { .. } => "IngestionInconsistent",
            AppError::IngestionTimeout(_) => "IngestionTimeout",
        }
    }

    /// Provider field errors carried by a rejection, if any
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            AppError::ProviderRejected(errors) => Some(errors),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::ProviderRejected(_) => {
                "Storage provider rejected the upload request".to_string()
            }
            AppError::ProviderUnavailable(_)
            | AppError::UploadFailed(_)
            | AppError::FinalizeFailed(_) => "Banner upload failed".to_string(),
            AppError::IngestionInconsistent { .. } => {
                "Banner file was uploaded but could not be recorded".to_string()
            }
            AppError::IngestionTimeout(ref phase) => {
                format!("Banner upload timed out during {}", phase)
            }
        }
    }
}
