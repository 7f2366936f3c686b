//! Staged banner ingestion
//!
//! inspect → request target → upload → finalize → persist
//!
//! Nothing is written to the store until the provider has returned a public
//! URL. A store failure after that point leaves an orphaned remote object,
//! which is reported as `IngestError::Inconsistent` rather than retried.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use marquee_core::models::{Banner, BannerMetadata, NewBanner};
use marquee_core::AppError;
use marquee_db::MetadataStore;
use marquee_staging::{StagingClient, StagingError, StagingResult};
use tokio::time::Instant;

use super::buffer::BufferedUpload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Inspecting,
    RequestingTarget,
    Uploading,
    Finalizing,
    Persisting,
}

impl std::fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IngestPhase::Inspecting => "inspecting upload",
            IngestPhase::RequestingTarget => "requesting staging target",
            IngestPhase::Uploading => "uploading",
            IngestPhase::Finalizing => "finalizing",
            IngestPhase::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Ingestion failed while {phase}: {source}")]
    Failed {
        phase: IngestPhase,
        #[source]
        source: StagingError,
    },

    #[error("Remote object {remote_url} was created but could not be recorded: {source}")]
    Inconsistent {
        remote_url: String,
        #[source]
        source: AppError,
    },

    #[error("Ingestion deadline exceeded while {phase}")]
    DeadlineExceeded { phase: IngestPhase },
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Failed { source, .. } => source.into(),
            IngestError::Inconsistent { remote_url, source } => AppError::IngestionInconsistent {
                remote_url,
                message: source.to_string(),
            },
            IngestError::DeadlineExceeded { phase } => AppError::IngestionTimeout(phase.to_string()),
        }
    }
}

/// Await `fut` unless `deadline` has passed or passes first
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        None => Some(fut.await),
        Some(deadline) if Instant::now() >= deadline => None,
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
    }
}

async fn staging_phase<T, F>(
    phase: IngestPhase,
    deadline: Option<Instant>,
    fut: F,
) -> Result<T, IngestError>
where
    F: Future<Output = StagingResult<T>>,
{
    tracing::debug!(phase = %phase, "Ingestion phase started");
    within(deadline, fut)
        .await
        .ok_or(IngestError::DeadlineExceeded { phase })?
        .map_err(|source| IngestError::Failed { phase, source })
}

#[derive(Clone)]
pub struct IngestionPipeline {
    store: Arc<dyn MetadataStore>,
    staging: Arc<dyn StagingClient>,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn MetadataStore>, staging: Arc<dyn StagingClient>) -> Self {
        Self { store, staging }
    }

    /// Stage, upload, finalize and record one banner.
    ///
    /// The upload is consumed; its temporary file is gone when this returns.
    /// `deadline` bounds every phase, including the one in flight when it
    /// passes.
    pub async fn ingest(
        &self,
        upload: BufferedUpload,
        metadata: BannerMetadata,
        deadline: Option<Instant>,
    ) -> Result<Banner, IngestError> {
        let started = std::time::Instant::now();

        let descriptor = staging_phase(IngestPhase::Inspecting, deadline, async {
            upload.inspect().await.map_err(StagingError::from)
        })
        .await?;

        let target = staging_phase(
            IngestPhase::RequestingTarget,
            deadline,
            self.staging.request_staging_target(&descriptor),
        )
        .await?;

        staging_phase(IngestPhase::Uploading, deadline, async {
            let content = tokio::fs::File::open(upload.path()).await?;
            self.staging
                .upload_binary(&target, &descriptor, Box::new(content))
                .await
        })
        .await?;
        drop(upload);

        let remote_url = staging_phase(
            IngestPhase::Finalizing,
            deadline,
            self.staging.finalize_object(
                target,
                metadata.alt_text.as_deref(),
                &descriptor.filename,
            ),
        )
        .await?;

        tracing::debug!(phase = %IngestPhase::Persisting, remote_url = %remote_url, "Ingestion phase started");
        let record = NewBanner::from_metadata(metadata, remote_url.clone(), Utc::now());
        let banner = match within(deadline, self.store.insert(record)).await {
            Some(Ok(banner)) => banner,
            Some(Err(source)) => return Err(self.inconsistent(remote_url, source)),
            None => {
                let source = AppError::IngestionTimeout(IngestPhase::Persisting.to_string());
                return Err(self.inconsistent(remote_url, source));
            }
        };

        tracing::info!(
            banner_id = %banner.id,
            remote_url = %banner.remote_url,
            filename = %descriptor.filename,
            size_bytes = descriptor.size_bytes,
            backend = self.staging.backend_name(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Banner ingested"
        );

        Ok(banner)
    }

    fn inconsistent(&self, remote_url: String, source: AppError) -> IngestError {
        tracing::error!(
            remote_url = %remote_url,
            backend = self.staging.backend_name(),
            error = %source,
            "Remote object finalized but banner record was not written; object is orphaned"
        );
        IngestError::Inconsistent { remote_url, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use marquee_core::models::{BannerUpdate, FieldError};
    use marquee_db::InMemoryBannerStore;
    use marquee_staging::test_helpers::{ScriptedFailure, ScriptedStagingClient};
    use std::time::Duration;
    use uuid::Uuid;

    struct FailingStore;

    #[async_trait]
    impl MetadataStore for FailingStore {
        async fn insert(&self, _banner: NewBanner) -> Result<Banner, AppError> {
            Err(AppError::Internal("connection reset".into()))
        }
        async fn find_all(&self) -> Result<Vec<Banner>, AppError> {
            Ok(vec![])
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Banner>, AppError> {
            Ok(None)
        }
        async fn delete_by_id(&self, _id: Uuid) -> Result<bool, AppError> {
            Ok(false)
        }
        async fn update_by_id(&self, _id: Uuid, _update: BannerUpdate) -> Result<bool, AppError> {
            Ok(false)
        }
        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn metadata() -> BannerMetadata {
        BannerMetadata {
            title: Some("Summer sale".into()),
            alt_text: Some("Beach at sunset".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 8, 31),
        }
    }

    async fn upload_in(dir: &std::path::Path) -> BufferedUpload {
        BufferedUpload::from_bytes(
            dir,
            Some("hero.png".into()),
            Some("image/png".into()),
            b"\x89PNG\r\n\x1a\nfake",
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_ingestion_persists_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBannerStore::new());
        let staging = Arc::new(ScriptedStagingClient::new());
        let pipeline = IngestionPipeline::new(store.clone(), staging.clone());

        let upload = upload_in(dir.path()).await;
        let temp_path = upload.path().to_path_buf();

        let banner = pipeline.ingest(upload, metadata(), None).await.unwrap();

        assert_eq!(banner.remote_url, ScriptedStagingClient::url_for("hero.png"));
        assert_eq!(banner.title.as_deref(), Some("Summer sale"));
        assert_eq!(store.len().await, 1);
        assert!(!temp_path.exists());

        let uploads = staging.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0.size_bytes, 12);
        assert_eq!(uploads[0].1, b"\x89PNG\r\n\x1a\nfake".to_vec());
        assert_eq!(staging.finalized_alts(), vec!["Beach at sunset".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_alt_falls_back_to_filename() {
        let dir = tempfile::tempdir().unwrap();
        let staging = Arc::new(ScriptedStagingClient::new());
        let pipeline = IngestionPipeline::new(Arc::new(InMemoryBannerStore::new()), staging.clone());

        let meta = BannerMetadata {
            alt_text: None,
            ..metadata()
        };
        pipeline.ingest(upload_in(dir.path()).await, meta, None).await.unwrap();

        assert_eq!(staging.finalized_alts(), vec!["hero.png".to_string()]);
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBannerStore::new());
        let staging = Arc::new(
            ScriptedStagingClient::new().fail_upload(ScriptedFailure::UploadFailed("status 500".into())),
        );
        let pipeline = IngestionPipeline::new(store.clone(), staging.clone());

        let upload = upload_in(dir.path()).await;
        let temp_path = upload.path().to_path_buf();

        let err = pipeline.ingest(upload, metadata(), None).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Failed {
                phase: IngestPhase::Uploading,
                source: StagingError::UploadFailed(_)
            }
        ));
        assert!(store.is_empty().await);
        assert_eq!(staging.finalize_calls(), 0);
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_finalize_failure_leaves_no_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBannerStore::new());
        let staging = Arc::new(
            ScriptedStagingClient::new()
                .fail_finalize(ScriptedFailure::FinalizeFailed("no file returned".into())),
        );
        let pipeline = IngestionPipeline::new(store.clone(), staging.clone());

        let upload = upload_in(dir.path()).await;
        let temp_path = upload.path().to_path_buf();

        let err = pipeline.ingest(upload, metadata(), None).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Failed {
                phase: IngestPhase::Finalizing,
                source: StagingError::FinalizeFailed(_)
            }
        ));
        assert_eq!(staging.upload_calls(), 1);
        assert_eq!(staging.finalize_calls(), 1);
        assert!(store.is_empty().await);
        assert!(!temp_path.exists());

        let app: AppError = err.into();
        assert!(matches!(app, AppError::FinalizeFailed(_)));
    }

    #[tokio::test]
    async fn test_unavailable_provider_fails_before_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBannerStore::new());
        let staging = Arc::new(
            ScriptedStagingClient::new()
                .fail_request(ScriptedFailure::Unavailable("connection refused".into())),
        );
        let pipeline = IngestionPipeline::new(store.clone(), staging.clone());

        let upload = upload_in(dir.path()).await;
        let temp_path = upload.path().to_path_buf();

        let err = pipeline.ingest(upload, metadata(), None).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Failed {
                phase: IngestPhase::RequestingTarget,
                source: StagingError::ProviderUnavailable(_)
            }
        ));
        assert_eq!(staging.upload_calls(), 0);
        assert!(store.is_empty().await);
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_rejection_keeps_field_errors() {
        let dir = tempfile::tempdir().unwrap();
        let rejection = vec![FieldError {
            field: vec!["input".into(), "0".into(), "mimeType".into()],
            message: "is not supported".into(),
        }];
        let staging = Arc::new(
            ScriptedStagingClient::new().fail_request(ScriptedFailure::Rejected(rejection.clone())),
        );
        let pipeline = IngestionPipeline::new(Arc::new(InMemoryBannerStore::new()), staging.clone());

        let err = pipeline
            .ingest(upload_in(dir.path()).await, metadata(), None)
            .await
            .unwrap_err();
        match err {
            IngestError::Failed {
                phase: IngestPhase::RequestingTarget,
                source: StagingError::ProviderRejected(errors),
            } => assert_eq!(errors, rejection),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(staging.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_after_finalize_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        let staging = Arc::new(ScriptedStagingClient::new());
        let pipeline = IngestionPipeline::new(Arc::new(FailingStore), staging.clone());

        let err = pipeline
            .ingest(upload_in(dir.path()).await, metadata(), None)
            .await
            .unwrap_err();
        match err {
            IngestError::Inconsistent { ref remote_url, .. } => {
                assert_eq!(remote_url, &ScriptedStagingClient::url_for("hero.png"));
            }
            ref other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(staging.finalize_calls(), 1);

        let app: AppError = err.into();
        assert!(matches!(app, AppError::IngestionInconsistent { .. }));
    }

    #[tokio::test]
    async fn test_expired_deadline_aborts_before_staging() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBannerStore::new());
        let staging = Arc::new(ScriptedStagingClient::new());
        let pipeline = IngestionPipeline::new(store.clone(), staging.clone());

        let upload = upload_in(dir.path()).await;
        let temp_path = upload.path().to_path_buf();
        let deadline = Instant::now() - Duration::from_millis(1);

        let err = pipeline
            .ingest(upload, metadata(), Some(deadline))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::DeadlineExceeded { .. }));
        assert_eq!(staging.request_calls(), 0);
        assert!(store.is_empty().await);
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_deadline_cancels_slow_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryBannerStore::new());
        let staging = Arc::new(ScriptedStagingClient::new().delay_upload(Duration::from_secs(30)));
        let pipeline = IngestionPipeline::new(store.clone(), staging.clone());

        let deadline = Instant::now() + Duration::from_millis(100);
        let err = pipeline
            .ingest(upload_in(dir.path()).await, metadata(), Some(deadline))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IngestError::DeadlineExceeded {
                phase: IngestPhase::Uploading
            }
        ));
        assert_eq!(staging.finalize_calls(), 0);
        assert!(store.is_empty().await);

        let app: AppError = err.into();
        assert!(matches!(app, AppError::IngestionTimeout(_)));
    }
}
