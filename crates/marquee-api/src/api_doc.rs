//! OpenAPI documentation

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use marquee_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marquee API",
        version = "0.1.0",
        description = "Timed banner ingestion and lifecycle service. Banners are uploaded through the storage provider's staged-upload protocol; their status (scheduled, active, expired) is derived from the display window at read time. Admin endpoints under /api require the master API key."
    ),
    paths(
        handlers::banner_upload::upload_banner,
        handlers::banners::list_banners,
        handlers::banners::get_banner,
        handlers::banners::update_banner,
        handlers::banners::delete_banner,
        handlers::public_feed::active_banners,
    ),
    components(
        schemas(
            models::Banner,
            models::BannerWithStatus,
            models::BannerListing,
            models::StatusCounts,
            models::UpdateBannerRequest,
            models::UploadBannerResponse,
            models::SuccessResponse,
            models::ActiveBanner,
            models::ActiveBannersResponse,
            models::FieldError,
            marquee_core::LifecycleStatus,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "banners", description = "Banner upload, listing and point mutations"),
        (name = "public", description = "Open storefront feed of active banners")
    )
)]
pub struct ApiDoc;
