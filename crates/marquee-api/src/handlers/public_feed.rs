use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use marquee_core::models::{ActiveBanner, ActiveBannersResponse};

use crate::state::AppState;

/// Banners currently inside their display window, for storefront clients.
///
/// Failures use the feed's own envelope (`success: false`), not `ErrorResponse`.
#[utoipa::path(
    get,
    path = "/apps/banner-api/active",
    tag = "public",
    responses(
        (status = 200, description = "Active banners", body = ActiveBannersResponse),
        (status = 500, description = "Feed unavailable", body = ActiveBannersResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "active_banners"))]
pub async fn active_banners(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.banners.list_active(state.today()).await {
        Ok(banners) => {
            let banners: Vec<ActiveBanner> = banners.into_iter().map(ActiveBanner::from).collect();
            (StatusCode::OK, Json(ActiveBannersResponse::ok(banners)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load active banners");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActiveBannersResponse::failed("Failed to fetch active banners")),
            )
        }
    }
}
