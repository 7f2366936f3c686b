use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form parameter the provider requires alongside the uploaded bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingParameter {
    pub name: String,
    pub value: String,
}

/// Provider-issued destination for a single upload attempt.
///
/// Not `Clone`: finalizing consumes it, so a target cannot be reused.
#[derive(Debug, PartialEq, Eq)]
pub struct StagingTarget {
    /// Endpoint the binary is POSTed to
    pub upload_url: String,
    /// Locator passed back to the provider when finalizing
    pub resource_url: String,
    /// Form fields sent before the file part, in order
    pub parameters: Vec<StagingParameter>,
}

/// Attributes of a buffered upload, inspected before staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// User error reported by the provider, passed through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Path to the offending input field, e.g. `["input", "0", "fileSize"]`
    #[serde(default)]
    pub field: Vec<String>,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field.join("."), self.message)
        }
    }
}
