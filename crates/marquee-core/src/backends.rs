use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Metadata store backends
///
/// Selected at startup via `METADATA_BACKEND`. `Memory` keeps records in-process
/// and loses them on restart; it exists for development and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    Postgres,
    Memory,
}

impl FromStr for MetadataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(MetadataBackend::Postgres),
            "memory" => Ok(MetadataBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid metadata backend: {}", s)),
        }
    }
}

impl Display for MetadataBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MetadataBackend::Postgres => write!(f, "postgres"),
            MetadataBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Staged-upload provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagingBackend {
    Shopify,
    Local,
}

impl FromStr for StagingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shopify" => Ok(StagingBackend::Shopify),
            "local" => Ok(StagingBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid staging backend: {}", s)),
        }
    }
}

impl Display for StagingBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StagingBackend::Shopify => write!(f, "shopify"),
            StagingBackend::Local => write!(f, "local"),
        }
    }
}
