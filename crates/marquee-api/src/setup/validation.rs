//! Startup configuration checks

use anyhow::Result;
use marquee_core::Config;

const MIN_MASTER_API_KEY_LENGTH: usize = 32;

/// Fail fast on configuration that would be insecure or unusable at runtime
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.master_api_key().len() < MIN_MASTER_API_KEY_LENGTH {
        return Err(anyhow::anyhow!(
            "MASTER_API_KEY must be at least {} characters long",
            MIN_MASTER_API_KEY_LENGTH
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.max_file_size_bytes() == 0 {
        return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
    }

    if config.ingest_deadline().is_zero() {
        return Err(anyhow::anyhow!("INGEST_DEADLINE_SECS must be greater than 0"));
    }

    if config.ingest_deadline() < config.provider_timeout() {
        tracing::warn!(
            ingest_deadline_secs = config.ingest_deadline().as_secs(),
            provider_timeout_secs = config.provider_timeout().as_secs(),
            "INGEST_DEADLINE_SECS is shorter than PROVIDER_TIMEOUT_SECS; slow provider calls will hit the deadline first"
        );
    }

    Ok(())
}
