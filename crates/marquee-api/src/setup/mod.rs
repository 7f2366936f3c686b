//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use marquee_core::Config;
use std::sync::Arc;

/// Build the state and router from configuration
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        metadata_backend = %config.metadata_backend(),
        staging_backend = %config.staging_backend(),
        "Configuration loaded and validated successfully"
    );

    let store = storage::setup_metadata_store(&config).await?;
    let staging = storage::setup_staging_client(&config).await?;

    let state = services::initialize_services(&config, store, staging);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
