//! Admin banner listing and point mutations

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use marquee_core::models::{BannerListing, BannerWithStatus, SuccessResponse, UpdateBannerRequest};
use marquee_core::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::parse_banner_fields;

#[utoipa::path(
    get,
    path = "/api/banners",
    tag = "banners",
    responses(
        (status = 200, description = "All banners, newest first, with status counts", body = BannerListing),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_banners"))]
pub async fn list_banners(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let listing = state.banners.list_all(state.today()).await?;
    Ok(Json(listing))
}

#[utoipa::path(
    get,
    path = "/api/banners/{id}",
    tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner with its current status", body = BannerWithStatus),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "Banner not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(banner_id = %id, operation = "get_banner"))]
pub async fn get_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let banner = state.banners.get_with_status(id, state.today()).await?;
    Ok(Json(banner))
}

#[utoipa::path(
    put,
    path = "/api/banners/{id}",
    tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    request_body = UpdateBannerRequest,
    responses(
        (status = 200, description = "Banner updated", body = SuccessResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "Banner not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(banner_id = %id, operation = "update_banner"))]
pub async fn update_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBannerRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;
    let update = parse_banner_fields(
        request.title,
        request.alt,
        request.start_date.as_deref(),
        request.end_date.as_deref(),
    )?;

    state.banners.update(id, update).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    delete,
    path = "/api/banners/{id}",
    tag = "banners",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 200, description = "Banner deleted", body = SuccessResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "Banner not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(banner_id = %id, operation = "delete_banner"))]
pub async fn delete_banner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.banners.delete(id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
