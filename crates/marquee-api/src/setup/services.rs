//! Service wiring

use std::sync::Arc;

use marquee_core::Config;
use marquee_db::MetadataStore;
use marquee_staging::StagingClient;

use crate::state::AppState;

/// Build the shared state around the injected store and staging client
pub fn initialize_services(
    config: &Config,
    store: Arc<dyn MetadataStore>,
    staging: Arc<dyn StagingClient>,
) -> Arc<AppState> {
    let state = AppState::new(config, store, staging);
    tracing::debug!(
        max_file_size_bytes = state.upload.max_file_size_bytes,
        allowed_content_types = %state.upload.allowed_content_types.join(","),
        temp_dir = %state.upload.temp_dir.display(),
        ingest_deadline_secs = state.upload.ingest_deadline.as_secs(),
        display_timezone = %state.display_timezone,
        "Services initialized"
    );
    Arc::new(state)
}
