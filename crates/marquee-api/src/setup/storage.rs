//! Metadata store and staging client construction

use std::sync::Arc;

use anyhow::{Context, Result};
use marquee_core::{Config, MetadataBackend};
use marquee_db::{BannerRepository, InMemoryBannerStore, MetadataStore};
use marquee_staging::{create_staging_client, StagingClient};

use super::database::setup_database;

pub async fn setup_metadata_store(config: &Config) -> Result<Arc<dyn MetadataStore>> {
    match config.metadata_backend() {
        MetadataBackend::Postgres => {
            let pool = setup_database(config).await?;
            Ok(Arc::new(BannerRepository::new(pool)))
        }
        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory metadata store; banners are lost on restart");
            Ok(Arc::new(InMemoryBannerStore::new()))
        }
    }
}

pub async fn setup_staging_client(config: &Config) -> Result<Arc<dyn StagingClient>> {
    let client = create_staging_client(config)
        .await
        .context("Failed to initialize staging client")?;
    tracing::info!(backend = client.backend_name(), "Staging client initialized");
    Ok(client)
}
