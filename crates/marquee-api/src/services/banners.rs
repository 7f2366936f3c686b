//! Read side and point mutations for banners.
//!
//! Status is never stored; every read classifies records against the `today`
//! the caller passes in.

use std::sync::Arc;

use chrono::NaiveDate;
use marquee_core::models::{Banner, BannerListing, BannerUpdate, BannerWithStatus, StatusCounts};
use marquee_core::{AppError, LifecycleStatus};
use marquee_db::MetadataStore;
use uuid::Uuid;

#[derive(Clone)]
pub struct BannerService {
    store: Arc<dyn MetadataStore>,
}

impl BannerService {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    async fn classified(&self, today: NaiveDate) -> Result<Vec<BannerWithStatus>, AppError> {
        let banners = self.store.find_all().await?;
        Ok(banners
            .into_iter()
            .map(|banner| {
                let status = banner.status_on(today);
                BannerWithStatus { banner, status }
            })
            .collect())
    }

    /// Every banner, newest first, with per-status counts
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self, today: NaiveDate) -> Result<BannerListing, AppError> {
        let banners = self.classified(today).await?;
        let mut counts = StatusCounts::default();
        for item in &banners {
            counts.record(item.status);
        }
        tracing::debug!(total = banners.len(), active = counts.active, "Listed banners");
        Ok(BannerListing { banners, counts })
    }

    /// Banners whose window contains `today`
    #[tracing::instrument(skip(self))]
    pub async fn list_active(&self, today: NaiveDate) -> Result<Vec<Banner>, AppError> {
        Ok(self
            .classified(today)
            .await?
            .into_iter()
            .filter(|item| item.status == LifecycleStatus::Active)
            .map(|item| item.banner)
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Banner, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Banner {} not found", id)))
    }

    pub async fn get_with_status(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<BannerWithStatus, AppError> {
        let banner = self.get(id).await?;
        let status = banner.status_on(today);
        Ok(BannerWithStatus { banner, status })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_by_id(id).await? {
            return Err(AppError::NotFound(format!("Banner {} not found", id)));
        }
        tracing::info!(banner_id = %id, "Banner deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update(&self, id: Uuid, update: BannerUpdate) -> Result<(), AppError> {
        if !self.store.update_by_id(id, update).await? {
            return Err(AppError::NotFound(format!("Banner {} not found", id)));
        }
        tracing::info!(banner_id = %id, "Banner updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use marquee_core::models::NewBanner;
    use marquee_db::InMemoryBannerStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed(
        store: &InMemoryBannerStore,
        title: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        age_secs: i64,
    ) -> Banner {
        store
            .insert(NewBanner {
                title: Some(title.to_string()),
                alt_text: None,
                start_date: start,
                end_date: end,
                remote_url: format!("https://cdn.example.test/{}.png", title),
                created_at: Utc::now() - Duration::seconds(age_secs),
            })
            .await
            .unwrap()
    }

    async fn seeded_service() -> BannerService {
        let store = InMemoryBannerStore::new();
        seed(&store, "running", Some(date(2024, 6, 1)), Some(date(2024, 6, 30)), 40).await;
        seed(&store, "open-ended", Some(date(2024, 1, 1)), None, 30).await;
        seed(&store, "future", Some(date(2024, 7, 1)), None, 20).await;
        seed(&store, "past", Some(date(2024, 5, 1)), Some(date(2024, 5, 31)), 10).await;
        seed(&store, "undated", None, None, 0).await;
        BannerService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_list_all_counts_sum_to_total() {
        let service = seeded_service().await;
        let listing = service.list_all(date(2024, 6, 15)).await.unwrap();

        assert_eq!(listing.banners.len(), 5);
        assert_eq!(listing.counts.total(), listing.banners.len());
        assert_eq!(listing.counts.active, 2);
        assert_eq!(listing.counts.scheduled, 2);
        assert_eq!(listing.counts.expired, 1);

        let titles: Vec<_> = listing
            .banners
            .iter()
            .map(|b| b.banner.title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["undated", "past", "future", "open-ended", "running"]);
    }

    #[tokio::test]
    async fn test_list_active_is_active_subset_of_list_all() {
        let service = seeded_service().await;
        let today = date(2024, 6, 15);

        let listing = service.list_all(today).await.unwrap();
        let expected: Vec<Uuid> = listing
            .banners
            .iter()
            .filter(|b| b.status == LifecycleStatus::Active)
            .map(|b| b.banner.id)
            .collect();
        let active: Vec<Uuid> = service
            .list_active(today)
            .await
            .unwrap()
            .iter()
            .map(|b| b.id)
            .collect();

        assert_eq!(active, expected);
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let service = seeded_service().await;
        let today = date(2024, 6, 15);
        let id = service.list_all(today).await.unwrap().banners[0].banner.id;

        service.delete(id).await.unwrap();
        assert!(matches!(service.delete(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get(id).await, Err(AppError::NotFound(_))));
        assert!(service
            .list_all(today)
            .await
            .unwrap()
            .banners
            .iter()
            .all(|b| b.banner.id != id));
    }

    #[tokio::test]
    async fn test_update_changes_status() {
        let service = seeded_service().await;
        let today = date(2024, 6, 15);
        let future = service
            .list_all(today)
            .await
            .unwrap()
            .banners
            .into_iter()
            .find(|b| b.status == LifecycleStatus::Scheduled && b.banner.start_date.is_some())
            .unwrap();

        service
            .update(
                future.banner.id,
                BannerUpdate {
                    title: Some("now running".into()),
                    alt_text: None,
                    start_date: Some(date(2024, 6, 10)),
                    end_date: None,
                },
            )
            .await
            .unwrap();

        let updated = service.get_with_status(future.banner.id, today).await.unwrap();
        assert_eq!(updated.status, LifecycleStatus::Active);
        assert_eq!(updated.banner.remote_url, future.banner.remote_url);
        assert_eq!(updated.banner.created_at, future.banner.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let service = seeded_service().await;
        let result = service.update(Uuid::new_v4(), BannerUpdate::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
