//! Configuration module
//!
//! Runtime configuration for the banner service: HTTP server, metadata store,
//! staging provider, upload limits, and ingestion deadlines. Values come from
//! environment variables (optionally seeded from a `.env` file).

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::backends::{MetadataBackend, StagingBackend};

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 20;
const INGEST_DEADLINE_SECS: u64 = 120;
const PROVIDER_TIMEOUT_SECS: u64 = 60;
const SHOPIFY_API_VERSION: &str = "2024-10";
const DEFAULT_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Settings shared by every deployment, regardless of backends
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: LogFormat,
    pub master_api_key: String,
}

/// Backend and ingestion settings
#[derive(Clone, Debug)]
pub struct BannerServiceConfig {
    pub base: BaseConfig,
    pub metadata_backend: MetadataBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub staging_backend: StagingBackend,
    pub shopify_shop_domain: Option<String>,
    pub shopify_access_token: Option<String>,
    pub shopify_api_version: String,
    pub local_staging_path: Option<String>,
    pub local_staging_base_url: Option<String>,
    pub upload_temp_dir: Option<PathBuf>,
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub ingest_deadline_secs: u64,
    pub provider_timeout_secs: u64,
    pub display_timezone: Tz,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<BannerServiceConfig>);

impl Config {
    fn inner(&self) -> &BannerServiceConfig {
        &self.0
    }

    /// Load configuration from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit key/value map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());
        let is_production = is_production_name(&environment);

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = var("BACKEND_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let log_format = match var("LOG_FORMAT")
            .unwrap_or_else(|| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port,
            cors_origins,
            environment,
            log_format,
            master_api_key: var("MASTER_API_KEY")
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("MASTER_API_KEY must be set"))?,
        };

        let metadata_backend: MetadataBackend = var("METADATA_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .parse()?;
        let staging_backend: StagingBackend = var("STAGING_BACKEND")
            .unwrap_or_else(|| "shopify".to_string())
            .parse()?;

        let display_timezone: Tz = var("DISPLAY_TIMEZONE")
            .unwrap_or_else(|| "UTC".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("DISPLAY_TIMEZONE is not a valid time zone: {}", e))?;

        let max_file_size_mb = var("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = BannerServiceConfig {
            base,
            metadata_backend,
            database_url: var("DATABASE_URL"),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            staging_backend,
            shopify_shop_domain: var("SHOPIFY_SHOP_DOMAIN"),
            shopify_access_token: var("SHOPIFY_ACCESS_TOKEN"),
            shopify_api_version: var("SHOPIFY_API_VERSION")
                .unwrap_or_else(|| SHOPIFY_API_VERSION.to_string()),
            local_staging_path: var("LOCAL_STAGING_PATH"),
            local_staging_base_url: var("LOCAL_STAGING_BASE_URL"),
            upload_temp_dir: var("UPLOAD_TEMP_DIR").map(PathBuf::from),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
            ingest_deadline_secs: var("INGEST_DEADLINE_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(INGEST_DEADLINE_SECS),
            provider_timeout_secs: var("PROVIDER_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PROVIDER_TIMEOUT_SECS),
            display_timezone,
        };

        Ok(Config(Box::new(config)))
    }

    /// Check that the selected backends have everything they need.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let c = self.inner();

        if c.metadata_backend == MetadataBackend::Postgres && c.database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be set when METADATA_BACKEND=postgres"
            ));
        }

        match c.staging_backend {
            StagingBackend::Shopify => {
                if c.shopify_shop_domain.is_none() || c.shopify_access_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "SHOPIFY_SHOP_DOMAIN and SHOPIFY_ACCESS_TOKEN must be set when STAGING_BACKEND=shopify"
                    ));
                }
            }
            StagingBackend::Local => {
                if c.local_staging_path.is_none() || c.local_staging_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STAGING_PATH and LOCAL_STAGING_BASE_URL must be set when STAGING_BACKEND=local"
                    ));
                }
            }
        }

        if self.is_production() && c.metadata_backend == MetadataBackend::Memory {
            return Err(anyhow::anyhow!(
                "METADATA_BACKEND=memory is not allowed in production"
            ));
        }

        if c.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner().base.log_format
    }

    pub fn master_api_key(&self) -> &str {
        &self.inner().base.master_api_key
    }

    pub fn metadata_backend(&self) -> MetadataBackend {
        self.inner().metadata_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn staging_backend(&self) -> StagingBackend {
        self.inner().staging_backend
    }

    pub fn shopify_shop_domain(&self) -> Option<&str> {
        self.inner().shopify_shop_domain.as_deref()
    }

    pub fn shopify_access_token(&self) -> Option<&str> {
        self.inner().shopify_access_token.as_deref()
    }

    pub fn shopify_api_version(&self) -> &str {
        &self.inner().shopify_api_version
    }

    pub fn local_staging_path(&self) -> Option<&str> {
        self.inner().local_staging_path.as_deref()
    }

    pub fn local_staging_base_url(&self) -> Option<&str> {
        self.inner().local_staging_base_url.as_deref()
    }

    /// Directory for buffering incoming uploads; falls back to the OS temp dir.
    pub fn upload_temp_dir(&self) -> PathBuf {
        self.inner()
            .upload_temp_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.inner().allowed_content_types
    }

    pub fn ingest_deadline(&self) -> Duration {
        Duration::from_secs(self.inner().ingest_deadline_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().provider_timeout_secs)
    }

    pub fn display_timezone(&self) -> Tz {
        self.inner().display_timezone
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_map(&vars(&[("MASTER_API_KEY", "secret")])).unwrap();
        assert_eq!(config.server_port(), 3000);
        assert_eq!(config.metadata_backend(), MetadataBackend::Postgres);
        assert_eq!(config.staging_backend(), StagingBackend::Shopify);
        assert_eq!(config.shopify_api_version(), "2024-10");
        assert_eq!(config.max_file_size_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.ingest_deadline(), Duration::from_secs(120));
        assert_eq!(config.display_timezone(), chrono_tz::UTC);
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.allowed_content_types().len(), 4);
        assert!(!config.is_production());
    }

    #[test]
    fn test_backend_port_wins_over_port() {
        let config = Config::from_map(&vars(&[
            ("MASTER_API_KEY", "secret"),
            ("PORT", "8080"),
            ("BACKEND_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.server_port(), 9090);
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = Config::from_map(&vars(&[
            ("MASTER_API_KEY", "secret"),
            ("INGEST_DEADLINE_SECS", "soon"),
            ("MAX_FILE_SIZE_MB", "-1"),
        ]))
        .unwrap();
        assert_eq!(config.ingest_deadline(), Duration::from_secs(120));
        assert_eq!(config.max_file_size_bytes(), 20 * 1024 * 1024);
    }

    #[test]
    fn test_master_key_required() {
        assert!(Config::from_map(&vars(&[])).is_err());
        assert!(Config::from_map(&vars(&[("MASTER_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let result = Config::from_map(&vars(&[
            ("MASTER_API_KEY", "secret"),
            ("ENVIRONMENT", "production"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let result = Config::from_map(&vars(&[
            ("MASTER_API_KEY", "secret"),
            ("DISPLAY_TIMEZONE", "Mars/Olympus_Mons"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_backend_settings() {
        let config = Config::from_map(&vars(&[("MASTER_API_KEY", "secret")])).unwrap();
        assert!(config.validate().is_err());

        let config = Config::from_map(&vars(&[
            ("MASTER_API_KEY", "secret"),
            ("METADATA_BACKEND", "memory"),
            ("STAGING_BACKEND", "local"),
            ("LOCAL_STAGING_PATH", "/tmp/marquee"),
            ("LOCAL_STAGING_BASE_URL", "http://localhost:3000/files"),
        ]))
        .unwrap();
        assert!(config.validate().is_ok());
    }
}
