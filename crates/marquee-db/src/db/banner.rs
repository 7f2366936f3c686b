use async_trait::async_trait;
use marquee_core::models::{Banner, BannerUpdate, NewBanner};
use marquee_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::store::MetadataStore;

const BANNER_COLUMNS: &str =
    "id, title, alt_text, start_date, end_date, remote_url, created_at";

/// Repository for banner records in Postgres
#[derive(Clone)]
pub struct BannerRepository {
    pool: PgPool,
}

impl BannerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for BannerRepository {
    #[tracing::instrument(skip(self, banner), fields(db.table = "banners", db.operation = "insert"))]
    async fn insert(&self, banner: NewBanner) -> Result<Banner, AppError> {
        let query = format!(
            r#"
            INSERT INTO banners (id, title, alt_text, start_date, end_date, remote_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BANNER_COLUMNS
        );

        let banner = sqlx::query_as::<Postgres, Banner>(&query)
            .bind(Uuid::new_v4())
            .bind(&banner.title)
            .bind(&banner.alt_text)
            .bind(banner.start_date)
            .bind(banner.end_date)
            .bind(&banner.remote_url)
            .bind(banner.created_at)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(banner_id = %banner.id, "Banner record inserted");
        Ok(banner)
    }

    #[tracing::instrument(skip(self), fields(db.table = "banners", db.operation = "select"))]
    async fn find_all(&self) -> Result<Vec<Banner>, AppError> {
        let query = format!(
            "SELECT {} FROM banners ORDER BY created_at DESC, id DESC",
            BANNER_COLUMNS
        );

        let banners = sqlx::query_as::<Postgres, Banner>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(banners)
    }

    #[tracing::instrument(skip(self), fields(db.table = "banners", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Banner>, AppError> {
        let query = format!("SELECT {} FROM banners WHERE id = $1", BANNER_COLUMNS);

        let banner = sqlx::query_as::<Postgres, Banner>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(banner)
    }

    #[tracing::instrument(skip(self), fields(db.table = "banners", db.operation = "delete", db.record_id = %id))]
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "banners", db.operation = "update", db.record_id = %id))]
    async fn update_by_id(&self, id: Uuid, update: BannerUpdate) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE banners
            SET title = $2, alt_text = $3, start_date = $4, end_date = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.alt_text)
        .bind(update.start_date)
        .bind(update.end_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<Postgres, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
