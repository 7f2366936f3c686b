//! Application state shared by all handlers.
//!
//! The store and staging client are built once at startup and injected as
//! trait objects; request handlers only ever see the services built on them.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use marquee_core::{today_in, Config};
use marquee_db::MetadataStore;
use marquee_staging::StagingClient;

use crate::services::{BannerService, IngestionPipeline};

/// Limits applied to incoming banner uploads
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub temp_dir: PathBuf,
    pub ingest_deadline: Duration,
}

impl UploadConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes(),
            allowed_content_types: config.allowed_content_types().to_vec(),
            temp_dir: config.upload_temp_dir(),
            ingest_deadline: config.ingest_deadline(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetadataStore>,
    pub staging: Arc<dyn StagingClient>,
    pub pipeline: IngestionPipeline,
    pub banners: BannerService,
    pub upload: UploadConfig,
    pub display_timezone: Tz,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn MetadataStore>,
        staging: Arc<dyn StagingClient>,
    ) -> Self {
        Self {
            pipeline: IngestionPipeline::new(store.clone(), staging.clone()),
            banners: BannerService::new(store.clone()),
            store,
            staging,
            upload: UploadConfig::from_config(config),
            display_timezone: config.display_timezone(),
        }
    }

    /// Current calendar day in the display time zone
    pub fn today(&self) -> NaiveDate {
        today_in(Utc::now(), self.display_timezone)
    }
}
