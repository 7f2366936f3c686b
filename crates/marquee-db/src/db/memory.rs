use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use marquee_core::models::{Banner, BannerUpdate, NewBanner};
use marquee_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::MetadataStore;

/// Process-local banner store for `METADATA_BACKEND=memory` and tests.
///
/// Records are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryBannerStore {
    banners: Arc<RwLock<HashMap<Uuid, Banner>>>,
}

impl InMemoryBannerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.banners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.banners.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryBannerStore {
    async fn insert(&self, banner: NewBanner) -> Result<Banner, AppError> {
        let mut banners = self.banners.write().await;

        let mut id = Uuid::new_v4();
        while banners.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let record = Banner {
            id,
            title: banner.title,
            alt_text: banner.alt_text,
            start_date: banner.start_date,
            end_date: banner.end_date,
            remote_url: banner.remote_url,
            created_at: banner.created_at,
        };
        banners.insert(id, record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<Banner>, AppError> {
        let mut all: Vec<Banner> = self.banners.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Banner>, AppError> {
        Ok(self.banners.read().await.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.banners.write().await.remove(&id).is_some())
    }

    async fn update_by_id(&self, id: Uuid, update: BannerUpdate) -> Result<bool, AppError> {
        let mut banners = self.banners.write().await;
        match banners.get_mut(&id) {
            Some(banner) => {
                banner.title = update.title;
                banner.alt_text = update.alt_text;
                banner.start_date = update.start_date;
                banner.end_date = update.end_date;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn new_banner(title: &str, created_offset_secs: i64) -> NewBanner {
        NewBanner {
            title: Some(title.to_string()),
            alt_text: None,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            end_date: None,
            remote_url: format!("https://cdn.example.com/{}.png", title),
            created_at: Utc::now() + Duration::seconds(created_offset_secs),
        }
    }

    #[tokio::test]
    async fn test_find_all_is_newest_first() {
        let store = InMemoryBannerStore::new();
        store.insert(new_banner("old", -60)).await.unwrap();
        store.insert(new_banner("new", 0)).await.unwrap();
        store.insert(new_banner("middle", -30)).await.unwrap();

        let titles: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["new", "middle", "old"]);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let store = InMemoryBannerStore::new();
        let banner = store.insert(new_banner("a", 0)).await.unwrap();

        assert!(store.delete_by_id(banner.id).await.unwrap());
        assert!(!store.delete_by_id(banner.id).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_keeps_url_and_created_at() {
        let store = InMemoryBannerStore::new();
        let banner = store.insert(new_banner("a", 0)).await.unwrap();

        let update = BannerUpdate {
            title: Some("renamed".to_string()),
            alt_text: Some("alt".to_string()),
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
        };
        assert!(store.update_by_id(banner.id, update).await.unwrap());

        let updated = store.find_by_id(banner.id).await.unwrap().unwrap();
        assert_eq!(updated.title.as_deref(), Some("renamed"));
        assert_eq!(updated.start_date, None);
        assert_eq!(updated.remote_url, banner.remote_url);
        assert_eq!(updated.created_at, banner.created_at);

        assert!(!store
            .update_by_id(Uuid::new_v4(), BannerUpdate::default())
            .await
            .unwrap());
    }
}
