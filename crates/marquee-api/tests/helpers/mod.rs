//! Test helpers: build the router around an in-memory store and a scripted
//! staging client.
//!
//! Run from workspace root: `cargo test -p marquee-api`.

pub mod auth;
pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use marquee_api::setup::routes;
use marquee_api::setup::services::initialize_services;
use marquee_core::models::{Banner, BannerUpdate, NewBanner};
use marquee_core::{AppError, Config};
use marquee_db::{InMemoryBannerStore, MetadataStore};
use marquee_staging::test_helpers::ScriptedStagingClient;
use tempfile::TempDir;
use uuid::Uuid;

/// Test application: server plus handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub staging: Arc<ScriptedStagingClient>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of buffered uploads still on disk
    pub fn leftover_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Store whose writes and reads always fail
pub struct FailingStore;

#[async_trait]
impl MetadataStore for FailingStore {
    async fn insert(&self, _banner: NewBanner) -> Result<Banner, AppError> {
        Err(AppError::Internal("connection reset by peer".into()))
    }
    async fn find_all(&self) -> Result<Vec<Banner>, AppError> {
        Err(AppError::Internal("connection reset by peer".into()))
    }
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Banner>, AppError> {
        Err(AppError::Internal("connection reset by peer".into()))
    }
    async fn delete_by_id(&self, _id: Uuid) -> Result<bool, AppError> {
        Err(AppError::Internal("connection reset by peer".into()))
    }
    async fn update_by_id(&self, _id: Uuid, _update: BannerUpdate) -> Result<bool, AppError> {
        Err(AppError::Internal("connection reset by peer".into()))
    }
    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Internal("connection reset by peer".into()))
    }
}

pub fn test_config(upload_dir: &TempDir, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("MASTER_API_KEY", auth::TEST_MASTER_API_KEY),
        ("METADATA_BACKEND", "memory"),
        ("STAGING_BACKEND", "shopify"),
        ("SHOPIFY_SHOP_DOMAIN", "marquee-test.myshopify.com"),
        ("SHOPIFY_ACCESS_TOKEN", "shpat_unused"),
        ("MAX_FILE_SIZE_MB", "1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.insert(
        "UPLOAD_TEMP_DIR".to_string(),
        upload_dir.path().display().to_string(),
    );
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_map(&vars).expect("Failed to build test config")
}

/// App with an empty in-memory store and a staging client that always succeeds
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(
        Arc::new(InMemoryBannerStore::new()),
        ScriptedStagingClient::new(),
        &[],
    )
    .await
}

pub async fn setup_test_app_with(
    store: Arc<dyn MetadataStore>,
    staging: ScriptedStagingClient,
    overrides: &[(&str, &str)],
) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let config = test_config(&upload_dir, overrides);

    let staging = Arc::new(staging);
    let state = initialize_services(&config, store, staging.clone());
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        staging,
        upload_dir,
    }
}
