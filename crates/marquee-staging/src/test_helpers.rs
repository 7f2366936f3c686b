//! Scripted staging client for tests
//!
//! Each protocol step can be told to fail or to stall; every call is counted
//! and uploaded bytes are captured so tests can assert on what reached the
//! provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use marquee_core::models::{FieldError, StagingParameter, StagingTarget, UploadDescriptor};
use tokio::io::AsyncReadExt;

use crate::traits::{ByteSource, StagingClient, StagingError, StagingResult};

/// Failure a scripted step should report
#[derive(Debug, Clone)]
pub enum ScriptedFailure {
    Rejected(Vec<FieldError>),
    Unavailable(String),
    UploadFailed(String),
    FinalizeFailed(String),
}

impl ScriptedFailure {
    fn to_error(&self) -> StagingError {
        match self {
            ScriptedFailure::Rejected(errors) => StagingError::ProviderRejected(errors.clone()),
            ScriptedFailure::Unavailable(msg) => StagingError::ProviderUnavailable(msg.clone()),
            ScriptedFailure::UploadFailed(msg) => StagingError::UploadFailed(msg.clone()),
            ScriptedFailure::FinalizeFailed(msg) => StagingError::FinalizeFailed(msg.clone()),
        }
    }
}

#[derive(Default)]
pub struct ScriptedStagingClient {
    request_failure: Mutex<Option<ScriptedFailure>>,
    upload_failure: Mutex<Option<ScriptedFailure>>,
    finalize_failure: Mutex<Option<ScriptedFailure>>,
    upload_delay: Mutex<Option<Duration>>,
    request_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    finalize_calls: AtomicUsize,
    uploads: Mutex<Vec<(UploadDescriptor, Vec<u8>)>>,
    finalized_alts: Mutex<Vec<String>>,
}

impl ScriptedStagingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_request(self, failure: ScriptedFailure) -> Self {
        *self.request_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn fail_upload(self, failure: ScriptedFailure) -> Self {
        *self.upload_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn fail_finalize(self, failure: ScriptedFailure) -> Self {
        *self.finalize_failure.lock().unwrap() = Some(failure);
        self
    }

    /// Make `upload_binary` sleep before completing
    pub fn delay_upload(self, delay: Duration) -> Self {
        *self.upload_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn request_calls(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn finalize_calls(&self) -> usize {
        self.finalize_calls.load(Ordering::SeqCst)
    }

    /// Descriptors and bytes received by `upload_binary`
    pub fn uploads(&self) -> Vec<(UploadDescriptor, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }

    /// Alt text sent with each finalize call
    pub fn finalized_alts(&self) -> Vec<String> {
        self.finalized_alts.lock().unwrap().clone()
    }

    /// Public URL the client hands out for a given filename
    pub fn url_for(filename: &str) -> String {
        format!("https://cdn.example.test/files/{}", filename)
    }
}

#[async_trait]
impl StagingClient for ScriptedStagingClient {
    async fn request_staging_target(
        &self,
        descriptor: &UploadDescriptor,
    ) -> StagingResult<StagingTarget> {
        let n = self.request_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.request_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        Ok(StagingTarget {
            upload_url: format!("https://staged.example.test/upload/{}", n),
            resource_url: format!("https://staged.example.test/tmp/{}/{}", n, descriptor.filename),
            parameters: vec![StagingParameter {
                name: "key".to_string(),
                value: format!("tmp/{}/{}", n, descriptor.filename),
            }],
        })
    }

    async fn upload_binary(
        &self,
        _target: &StagingTarget,
        descriptor: &UploadDescriptor,
        mut content: ByteSource,
    ) -> StagingResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.upload_failure.lock().unwrap().clone();
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        let mut data = Vec::new();
        content.read_to_end(&mut data).await?;
        if data.len() as u64 != descriptor.size_bytes {
            return Err(StagingError::UploadFailed(format!(
                "expected {} bytes, got {}",
                descriptor.size_bytes,
                data.len()
            )));
        }
        self.uploads.lock().unwrap().push((descriptor.clone(), data));
        Ok(())
    }

    async fn finalize_object(
        &self,
        target: StagingTarget,
        alt_text: Option<&str>,
        fallback_alt: &str,
    ) -> StagingResult<String> {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);
        self.finalized_alts
            .lock()
            .unwrap()
            .push(alt_text.unwrap_or(fallback_alt).to_string());

        if let Some(failure) = self.finalize_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }

        let filename = target
            .resource_url
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Ok(Self::url_for(&filename))
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
