use async_trait::async_trait;
use marquee_core::models::{Banner, BannerUpdate, NewBanner};
use marquee_core::AppError;
use uuid::Uuid;

/// Persistence for banner records.
///
/// Implementations hold no business rules: no status column, no date-window
/// checks. Writes are last-writer-wins.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a record and return it with its assigned id
    async fn insert(&self, banner: NewBanner) -> Result<Banner, AppError>;

    /// All records, newest `created_at` first
    async fn find_all(&self) -> Result<Vec<Banner>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Banner>, AppError>;

    /// Returns `false` when no record had this id
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError>;

    /// Replace the display fields; returns `false` when no record had this id
    async fn update_by_id(&self, id: Uuid, update: BannerUpdate) -> Result<bool, AppError>;

    /// Cheap reachability probe for health checks
    async fn ping(&self) -> Result<(), AppError>;
}
