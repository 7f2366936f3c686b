use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use marquee_core::models::UploadBannerResponse;
use tokio::time::Instant;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::read_banner_form;

/// Upload a banner image and register it.
///
/// The file goes through the provider's staged-upload protocol; a record is
/// only written once the provider has returned a public URL.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "banners",
    request_body(
        content = inline(Object),
        content_type = "multipart/form-data",
        description = "File field `banner`; optional text fields `title`, `alt`, `startDate`, `endDate` (YYYY-MM-DD)"
    ),
    responses(
        (status = 200, description = "Banner uploaded", body = UploadBannerResponse),
        (status = 400, description = "Invalid input or rejected by the provider", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Uploaded but not recorded", body = ErrorResponse),
        (status = 502, description = "Provider failure", body = ErrorResponse),
        (status = 504, description = "Ingestion deadline exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_banner"))]
pub async fn upload_banner(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let deadline = Instant::now() + state.upload.ingest_deadline;
    let form = read_banner_form(multipart, &state.upload).await?;

    let banner = state
        .pipeline
        .ingest(form.upload, form.metadata, Some(deadline))
        .await?;

    Ok(Json(UploadBannerResponse {
        success: true,
        id: banner.id,
        url: banner.remote_url,
    }))
}
