//! Domain route groups

use crate::constants::{API_BASE, APPS_BASE};
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use marquee_core::{Config, StagingBackend};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Admin banner management (authenticated)
pub fn banner_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/upload", API_BASE),
            post(handlers::banner_upload::upload_banner),
        )
        .route(
            &format!("{}/banners", API_BASE),
            get(handlers::banners::list_banners),
        )
        .route(
            &format!("{}/banners/{{id}}", API_BASE),
            get(handlers::banners::get_banner)
                .put(handlers::banners::update_banner)
                .delete(handlers::banners::delete_banner),
        )
}

/// Storefront feed (open)
pub fn public_feed_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/active", APPS_BASE),
        get(handlers::public_feed::active_banners),
    )
}

/// With the local staging backend, serve finalized files from the path
/// component of `LOCAL_STAGING_BASE_URL`
pub fn local_files_service(config: &Config) -> Option<(String, ServeDir)> {
    if config.staging_backend() != StagingBackend::Local {
        return None;
    }
    let root = config.local_staging_path()?;
    let base_url = config.local_staging_base_url()?;

    let path = match base_url.find("://") {
        Some(scheme_end) => {
            let rest = &base_url[scheme_end + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("")
        }
        None => base_url,
    }
    .trim_end_matches('/');

    if path.is_empty() || !path.starts_with('/') {
        tracing::warn!(
            base_url = %base_url,
            "LOCAL_STAGING_BASE_URL has no path; local files are not served by this process"
        );
        return None;
    }

    tracing::info!(path = %path, root = %root, "Serving local staging files");
    Some((path.to_string(), ServeDir::new(root)))
}
