//! HTTP client for the Marquee admin API.
//!
//! Reads MARQUEE_API_URL (or API_URL) and MARQUEE_API_KEY (or API_KEY).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use marquee_core::models::{
    ActiveBannersResponse, BannerListing, BannerWithStatus, SuccessResponse, UploadBannerResponse,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {key}`
    Bearer(String),
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// Display fields sent with an upload or an update; `None` is sent as absent
#[derive(Debug, Default, Clone, Serialize)]
pub struct BannerFields {
    pub title: Option<String>,
    pub alt: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        // Uploads wait on the provider, so this must outlast the server's ingest deadline
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MARQUEE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let api_key = std::env::var("MARQUEE_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .context("Missing API key. Set MARQUEE_API_KEY or API_KEY")?;

        Self::new(base_url, Auth::Bearer(api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(key) => request.header("Authorization", format!("Bearer {}", key)),
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// Upload a local image file with optional display fields
    pub async fn upload_banner(
        &self,
        file_path: &Path,
        fields: &BannerFields,
        content_type: Option<&str>,
    ) -> Result<UploadBannerResponse> {
        let data = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("banner.png")
            .to_string();
        let mime_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| mime_from_extension(&filename).to_string());

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename)
            .mime_str(&mime_type)
            .with_context(|| format!("Invalid content type: {}", mime_type))?;

        let mut form = reqwest::multipart::Form::new();
        for (name, value) in [
            ("title", &fields.title),
            ("alt", &fields.alt),
            ("startDate", &fields.start_date),
            ("endDate", &fields.end_date),
        ] {
            if let Some(value) = value {
                form = form.text(name, value.clone());
            }
        }
        let form = form.part("banner", part);

        self.send(self.client.post(self.build_url("/api/upload")).multipart(form))
            .await
    }

    pub async fn list_banners(&self) -> Result<BannerListing> {
        self.send(self.client.get(self.build_url("/api/banners")))
            .await
    }

    pub async fn get_banner(&self, id: Uuid) -> Result<BannerWithStatus> {
        self.send(self.client.get(self.build_url(&format!("/api/banners/{}", id))))
            .await
    }

    /// Replace a banner's display fields
    pub async fn update_banner(&self, id: Uuid, fields: &BannerFields) -> Result<SuccessResponse> {
        let url = self.build_url(&format!("/api/banners/{}", id));
        self.send(self.client.put(url).json(fields)).await
    }

    pub async fn delete_banner(&self, id: Uuid) -> Result<SuccessResponse> {
        let url = self.build_url(&format!("/api/banners/{}", id));
        self.send(self.client.delete(url)).await
    }

    /// The storefront feed; sent with credentials although the route ignores them
    pub async fn active_banners(&self) -> Result<ActiveBannersResponse> {
        self.send(self.client.get(self.build_url("/apps/banner-api/active")))
            .await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&error_text)
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(error_text);

    Err(anyhow::anyhow!(
        "API request failed with status {}: {}",
        status,
        message
    ))
}

/// Guess an image MIME type from a filename; the server decides what it accepts
pub fn mime_from_extension(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("hero.JPG"), "image/jpeg");
        assert_eq!(mime_from_extension("hero.webp"), "image/webp");
        assert_eq!(mime_from_extension("hero"), "image/png");
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = ApiClient::new(
            "http://localhost:3000/".to_string(),
            Auth::XApiKey("key".to_string()),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.build_url("/api/banners"),
            "http://localhost:3000/api/banners"
        );
    }

    #[test]
    fn test_banner_fields_serialize_with_wire_names() {
        let fields = BannerFields {
            title: Some("Summer".into()),
            start_date: Some("2024-06-01".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["startDate"], "2024-06-01");
        assert!(json["endDate"].is_null());
    }
}
