//! Local filesystem staging client for development.
//!
//! Targets are files under `{base_path}/staging/`; finalizing moves them to
//! `{base_path}/banners/` and serves them from `{base_url}/banners/...`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use marquee_core::models::{StagingTarget, UploadDescriptor};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::traits::{ByteSource, StagingClient, StagingError, StagingResult};

const STAGING_DIR: &str = "staging";
const OBJECTS_DIR: &str = "banners";

#[derive(Clone, Debug)]
pub struct LocalStagingClient {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStagingClient {
    /// # Arguments
    /// * `base_path` - Root directory, e.g. "/var/lib/marquee"
    /// * `base_url` - URL the root is served from, e.g. "http://localhost:3000/files"
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StagingResult<Self> {
        let base_path = base_path.into();

        for dir in [STAGING_DIR, OBJECTS_DIR] {
            let path = base_path.join(dir);
            fs::create_dir_all(&path).await.map_err(|e| {
                StagingError::Config(format!(
                    "Failed to create staging directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            base_path,
            base_url,
        })
    }

    /// Resolve a key under the base directory, rejecting traversal
    fn key_to_path(&self, key: &str) -> StagingResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StagingError::UploadFailed(format!(
                "invalid staging key: {}",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(path: &Path) -> StagingResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// Reduce a client filename to a safe single path segment
fn safe_segment(filename: &str) -> String {
    let cleaned: String = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl StagingClient for LocalStagingClient {
    async fn request_staging_target(
        &self,
        descriptor: &UploadDescriptor,
    ) -> StagingResult<StagingTarget> {
        let key = format!(
            "{}/{}-{}",
            STAGING_DIR,
            Uuid::new_v4(),
            safe_segment(&descriptor.filename)
        );
        Ok(StagingTarget {
            upload_url: key.clone(),
            resource_url: key,
            parameters: Vec::new(),
        })
    }

    async fn upload_binary(
        &self,
        target: &StagingTarget,
        descriptor: &UploadDescriptor,
        mut content: ByteSource,
    ) -> StagingResult<()> {
        let path = self.key_to_path(&target.upload_url)?;
        Self::ensure_parent_dir(&path).await?;
        let start = Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StagingError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        // Removes the partial file on any early return, including cancellation
        let guard = TempPath::from_path(path.clone());

        let written = tokio::io::copy(&mut content, &mut file).await.map_err(|e| {
            StagingError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.flush().await?;
        file.sync_all().await?;

        if written != descriptor.size_bytes {
            return Err(StagingError::UploadFailed(format!(
                "size mismatch: expected {} bytes, received {}",
                descriptor.size_bytes, written
            )));
        }
        guard.keep().map_err(|e| StagingError::Io(e.error))?;

        tracing::info!(
            path = %path.display(),
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local staging upload successful"
        );
        Ok(())
    }

    async fn finalize_object(
        &self,
        target: StagingTarget,
        _alt_text: Option<&str>,
        _fallback_alt: &str,
    ) -> StagingResult<String> {
        let staged = self.key_to_path(&target.resource_url)?;
        if !fs::try_exists(&staged).await.unwrap_or(false) {
            return Err(StagingError::FinalizeFailed(format!(
                "nothing uploaded to {}",
                target.resource_url
            )));
        }

        let name = staged
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StagingError::FinalizeFailed("invalid staged file name".to_string()))?
            .to_string();
        let key = format!("{}/{}", OBJECTS_DIR, name);
        let dest = self.key_to_path(&key)?;
        Self::ensure_parent_dir(&dest).await?;

        fs::rename(&staged, &dest).await.map_err(|e| {
            StagingError::FinalizeFailed(format!("Failed to move {}: {}", staged.display(), e))
        })?;

        Ok(self.generate_url(&key))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
