use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::lifecycle::LifecycleStatus;

/// Persisted banner record.
///
/// A record only exists once its binary has been finalized remotely, so
/// `remote_url` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Banner {
    pub id: Uuid,
    pub title: Option<String>,
    #[serde(rename = "alt")]
    pub alt_text: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "endDate")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "url")]
    pub remote_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Values written by the ingestion pipeline; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewBanner {
    pub title: Option<String>,
    pub alt_text: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub remote_url: String,
    pub created_at: DateTime<Utc>,
}

/// Display fields supplied with an upload, already parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerMetadata {
    pub title: Option<String>,
    pub alt_text: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Replacement values for the four display fields of an existing banner
pub type BannerUpdate = BannerMetadata;

impl NewBanner {
    pub fn from_metadata(
        metadata: BannerMetadata,
        remote_url: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        NewBanner {
            title: metadata.title,
            alt_text: metadata.alt_text,
            start_date: metadata.start_date,
            end_date: metadata.end_date,
            remote_url,
            created_at,
        }
    }
}

impl Banner {
    pub fn status_on(&self, today: NaiveDate) -> LifecycleStatus {
        crate::lifecycle::classify(self.start_date, self.end_date, today)
    }
}

/// Longest title accepted on upload or update, in characters
pub const MAX_TITLE_CHARS: usize = 255;
/// Longest alt text accepted on upload or update, in characters
pub const MAX_ALT_CHARS: usize = 512;

/// Request DTO for updating a banner's display fields.
///
/// Dates are `YYYY-MM-DD`; empty strings clear the date.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateBannerRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 512, message = "Alt text must be at most 512 characters"))]
    pub alt: Option<String>,
    #[serde(default, rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate")]
    pub end_date: Option<String>,
}

/// Banner together with its status on the evaluated day
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BannerWithStatus {
    #[serde(flatten)]
    pub banner: Banner,
    pub status: LifecycleStatus,
}

/// Per-status tallies of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCounts {
    pub active: usize,
    pub scheduled: usize,
    pub expired: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: LifecycleStatus) {
        match status {
            LifecycleStatus::Active => self.active += 1,
            LifecycleStatus::Scheduled => self.scheduled += 1,
            LifecycleStatus::Expired => self.expired += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.active + self.scheduled + self.expired
    }
}

/// Admin listing: every banner, newest first, with counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BannerListing {
    pub banners: Vec<BannerWithStatus>,
    pub counts: StatusCounts,
}

/// Response after a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadBannerResponse {
    pub success: bool,
    pub id: Uuid,
    pub url: String,
}

/// Generic acknowledgement for point mutations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Banner as exposed by the public storefront feed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveBanner {
    pub id: Uuid,
    pub title: Option<String>,
    pub alt: Option<String>,
    pub url: String,
    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "endDate")]
    pub end_date: Option<NaiveDate>,
}

impl From<Banner> for ActiveBanner {
    fn from(banner: Banner) -> Self {
        ActiveBanner {
            id: banner.id,
            title: banner.title,
            alt: banner.alt_text,
            url: banner.remote_url,
            start_date: banner.start_date,
            end_date: banner.end_date,
        }
    }
}

/// Public feed payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActiveBannersResponse {
    pub success: bool,
    pub banners: Vec<ActiveBanner>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActiveBannersResponse {
    pub fn ok(banners: Vec<ActiveBanner>) -> Self {
        let count = banners.len();
        ActiveBannersResponse {
            success: true,
            banners,
            count,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ActiveBannersResponse {
            success: false,
            banners: Vec::new(),
            count: 0,
            error: Some(error.into()),
        }
    }
}
