//! Shopify Admin GraphQL staged-upload client
//!
//! `stagedUploadsCreate` issues the target, the bytes are POSTed as multipart
//! form data directly to the target URL, and `fileCreate` registers the upload
//! as a store file.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use marquee_core::models::{FieldError, StagingParameter, StagingTarget, UploadDescriptor};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;

use crate::traits::{ByteSource, StagingClient, StagingError, StagingResult};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
const MAX_ERROR_BODY_CHARS: usize = 512;

const STAGED_UPLOADS_CREATE: &str = r#"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters { name value }
    }
    userErrors { field message }
  }
}
"#;

const FILE_CREATE: &str = r#"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      id
      alt
      preview { image { url } }
    }
    userErrors { field message }
  }
}
"#;

// GraphQL wire structures

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserError {
    field: Option<Vec<String>>,
    message: String,
}

impl From<UserError> for FieldError {
    fn from(err: UserError) -> Self {
        FieldError {
            field: err.field.unwrap_or_default(),
            message: err.message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsData {
    staged_uploads_create: Option<StagedUploadsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsPayload {
    #[serde(default)]
    staged_targets: Option<Vec<WireTarget>>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTarget {
    url: Option<String>,
    resource_url: Option<String>,
    #[serde(default)]
    parameters: Option<Vec<WireParameter>>,
}

#[derive(Debug, Deserialize)]
struct WireParameter {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreateData {
    file_create: Option<FileCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreatePayload {
    #[serde(default)]
    files: Option<Vec<CreatedFile>>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    #[allow(dead_code)]
    id: Option<String>,
    preview: Option<FilePreview>,
}

#[derive(Debug, Deserialize)]
struct FilePreview {
    image: Option<PreviewImage>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    url: Option<String>,
}

/// Staging client backed by the Shopify Admin API
#[derive(Clone)]
pub struct ShopifyStagingClient {
    http: reqwest::Client,
    graphql_url: String,
    access_token: String,
}

impl std::fmt::Debug for ShopifyStagingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStagingClient")
            .field("graphql_url", &self.graphql_url)
            .finish()
    }
}

impl ShopifyStagingClient {
    /// Create a client for `https://{shop_domain}/admin/api/{api_version}/graphql.json`
    ///
    /// # Arguments
    /// * `shop_domain` - e.g. "my-store.myshopify.com"
    /// * `api_version` - Admin API version, e.g. "2024-10"
    /// * `access_token` - Admin API access token, already authorized
    /// * `timeout` - per-request timeout applied to every provider call
    pub fn new(
        shop_domain: &str,
        api_version: &str,
        access_token: String,
        timeout: Duration,
    ) -> StagingResult<Self> {
        let domain = shop_domain
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/');
        if domain.is_empty() {
            return Err(StagingError::Config("shop domain is empty".to_string()));
        }
        let graphql_url = format!("https://{}/admin/api/{}/graphql.json", domain, api_version);
        Self::with_endpoint(graphql_url, access_token, timeout)
    }

    /// Create a client against an explicit GraphQL endpoint
    pub fn with_endpoint(
        graphql_url: String,
        access_token: String,
        timeout: Duration,
    ) -> StagingResult<Self> {
        if access_token.trim().is_empty() {
            return Err(StagingError::Config("access token is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StagingError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            graphql_url,
            access_token,
        })
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Run a GraphQL operation. Transport, status and top-level GraphQL errors
    /// are all reported through `on_failure`.
    async fn graphql<T>(
        &self,
        query: &str,
        variables: Value,
        on_failure: fn(String) -> StagingError,
    ) -> StagingResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.graphql_url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| on_failure(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(on_failure(format!(
                "status {}: {}",
                status,
                truncate(&body, MAX_ERROR_BODY_CHARS)
            )));
        }

        let envelope: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| on_failure(format!("malformed response: {}", e)))?;

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(on_failure(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| on_failure("response contained no data".to_string()))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[async_trait]
impl StagingClient for ShopifyStagingClient {
    #[tracing::instrument(skip(self), fields(provider = "shopify", filename = %descriptor.filename))]
    async fn request_staging_target(
        &self,
        descriptor: &UploadDescriptor,
    ) -> StagingResult<StagingTarget> {
        let variables = json!({
            "input": [{
                "resource": "FILE",
                "filename": descriptor.filename,
                "mimeType": descriptor.mime_type,
                "fileSize": descriptor.size_bytes.to_string(),
                "httpMethod": "POST",
            }]
        });

        let data: StagedUploadsData = self
            .graphql(
                STAGED_UPLOADS_CREATE,
                variables,
                StagingError::ProviderUnavailable,
            )
            .await?;

        let payload = data.staged_uploads_create.ok_or_else(|| {
            StagingError::ProviderUnavailable("stagedUploadsCreate returned null".to_string())
        })?;

        if !payload.user_errors.is_empty() {
            return Err(StagingError::ProviderRejected(
                payload.user_errors.into_iter().map(FieldError::from).collect(),
            ));
        }

        let target = payload
            .staged_targets
            .and_then(|targets| targets.into_iter().next())
            .ok_or_else(|| {
                StagingError::ProviderUnavailable("No staged upload target returned".to_string())
            })?;

        let upload_url = target.url.filter(|u| !u.is_empty()).ok_or_else(|| {
            StagingError::ProviderUnavailable("Staged upload target has no url".to_string())
        })?;

        Ok(StagingTarget {
            resource_url: target.resource_url.unwrap_or_else(|| upload_url.clone()),
            upload_url,
            parameters: target
                .parameters
                .unwrap_or_default()
                .into_iter()
                .map(|p| StagingParameter {
                    name: p.name,
                    value: p.value,
                })
                .collect(),
        })
    }

    #[tracing::instrument(skip(self, target, content), fields(provider = "shopify", size_bytes = descriptor.size_bytes))]
    async fn upload_binary(
        &self,
        target: &StagingTarget,
        descriptor: &UploadDescriptor,
        content: ByteSource,
    ) -> StagingResult<()> {
        let start = Instant::now();

        let mut form = Form::new();
        for param in &target.parameters {
            form = form.text(param.name.clone(), param.value.clone());
        }

        let body = reqwest::Body::wrap_stream(ReaderStream::new(content));
        let file_part = Part::stream_with_length(body, descriptor.size_bytes)
            .file_name(descriptor.filename.clone())
            .mime_str(&descriptor.mime_type)
            .map_err(|e| StagingError::UploadFailed(format!("invalid content type: {}", e)))?;
        form = form.part("file", file_part);

        let response = self
            .http
            .post(&target.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StagingError::UploadFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StagingError::UploadFailed(format!(
                "status {}: {}",
                status,
                truncate(&body, MAX_ERROR_BODY_CHARS)
            )));
        }

        tracing::info!(
            status = %status,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Staged upload accepted"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self, target, alt_text), fields(provider = "shopify"))]
    async fn finalize_object(
        &self,
        target: StagingTarget,
        alt_text: Option<&str>,
        fallback_alt: &str,
    ) -> StagingResult<String> {
        let alt = alt_text.filter(|a| !a.is_empty()).unwrap_or(fallback_alt);
        let variables = json!({
            "files": [{
                "alt": alt,
                "contentType": "IMAGE",
                "originalSource": target.resource_url,
            }]
        });

        let data: FileCreateData = self
            .graphql(FILE_CREATE, variables, StagingError::FinalizeFailed)
            .await?;

        let payload = data.file_create.ok_or_else(|| {
            StagingError::FinalizeFailed("fileCreate returned null".to_string())
        })?;

        if !payload.user_errors.is_empty() {
            let messages: Vec<String> = payload
                .user_errors
                .into_iter()
                .map(|e| FieldError::from(e).to_string())
                .collect();
            return Err(StagingError::FinalizeFailed(messages.join("; ")));
        }

        let file = payload
            .files
            .and_then(|files| files.into_iter().next())
            .ok_or_else(|| StagingError::FinalizeFailed("provider returned no file".to_string()))?;

        // Preview is generated asynchronously; fall back to the staged resource.
        let url = file
            .preview
            .and_then(|p| p.image)
            .and_then(|i| i.url)
            .filter(|u| !u.is_empty())
            .unwrap_or(target.resource_url);

        Ok(url)
    }

    fn backend_name(&self) -> &'static str {
        "shopify"
    }
}
