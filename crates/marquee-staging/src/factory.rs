#[cfg(feature = "staging-local")]
use crate::LocalStagingClient;
#[cfg(feature = "staging-shopify")]
use crate::ShopifyStagingClient;
use crate::{StagingBackend, StagingClient, StagingError, StagingResult};
use marquee_core::Config;
use std::sync::Arc;

/// Create the staging client selected by `STAGING_BACKEND`
pub async fn create_staging_client(config: &Config) -> StagingResult<Arc<dyn StagingClient>> {
    match config.staging_backend() {
        #[cfg(feature = "staging-shopify")]
        StagingBackend::Shopify => {
            let shop_domain = config.shopify_shop_domain().ok_or_else(|| {
                StagingError::Config("SHOPIFY_SHOP_DOMAIN not configured".to_string())
            })?;
            let access_token = config.shopify_access_token().ok_or_else(|| {
                StagingError::Config("SHOPIFY_ACCESS_TOKEN not configured".to_string())
            })?;

            let client = ShopifyStagingClient::new(
                shop_domain,
                config.shopify_api_version(),
                access_token.to_string(),
                config.provider_timeout(),
            )?;
            Ok(Arc::new(client))
        }

        #[cfg(not(feature = "staging-shopify"))]
        StagingBackend::Shopify => Err(StagingError::Config(
            "Shopify staging backend not available (staging-shopify feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "staging-local")]
        StagingBackend::Local => {
            let base_path = config.local_staging_path().ok_or_else(|| {
                StagingError::Config("LOCAL_STAGING_PATH not configured".to_string())
            })?;
            let base_url = config.local_staging_base_url().ok_or_else(|| {
                StagingError::Config("LOCAL_STAGING_BASE_URL not configured".to_string())
            })?;

            let client = LocalStagingClient::new(base_path, base_url.to_string()).await?;
            Ok(Arc::new(client))
        }

        #[cfg(not(feature = "staging-local"))]
        StagingBackend::Local => Err(StagingError::Config(
            "Local staging backend not available (staging-local feature not enabled)".to_string(),
        )),
    }
}
