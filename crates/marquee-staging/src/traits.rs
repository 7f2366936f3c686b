//! Staged-upload client trait
//!
//! Every provider follows the same three-step protocol: obtain a one-shot
//! target, send the bytes to it, then finalize the target into a permanent
//! object with a public URL.

use async_trait::async_trait;
use marquee_core::models::{FieldError, StagingTarget, UploadDescriptor};
use marquee_core::AppError;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Staging operation errors
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Provider rejected staging request: {}", join_field_errors(.0))]
    ProviderRejected(Vec<FieldError>),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Finalize failed: {0}")]
    FinalizeFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for staging operations
pub type StagingResult<T> = Result<T, StagingError>;

/// Byte source handed to `upload_binary`
pub type ByteSource = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// Client for an object-storage provider's staged-upload protocol.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait StagingClient: Send + Sync {
    /// Ask the provider for a one-shot upload target
    async fn request_staging_target(
        &self,
        descriptor: &UploadDescriptor,
    ) -> StagingResult<StagingTarget>;

    /// Stream the file bytes to the target
    async fn upload_binary(
        &self,
        target: &StagingTarget,
        descriptor: &UploadDescriptor,
        content: ByteSource,
    ) -> StagingResult<()>;

    /// Turn the uploaded target into a permanent object and return its public URL.
    ///
    /// `alt_text` falls back to `fallback_alt` (the filename) when absent.
    async fn finalize_object(
        &self,
        target: StagingTarget,
        alt_text: Option<&str>,
        fallback_alt: &str,
    ) -> StagingResult<String>;

    /// Name of the backend, for logs
    fn backend_name(&self) -> &'static str;
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::ProviderRejected(errors) => AppError::ProviderRejected(errors),
            StagingError::ProviderUnavailable(msg) => AppError::ProviderUnavailable(msg),
            StagingError::UploadFailed(msg) => AppError::UploadFailed(msg),
            StagingError::FinalizeFailed(msg) => AppError::FinalizeFailed(msg),
            StagingError::Config(msg) => AppError::Internal(format!("Staging configuration: {}", msg)),
            StagingError::Io(e) => AppError::Internal(format!("Staging IO error: {}", e)),
        }
    }
}
