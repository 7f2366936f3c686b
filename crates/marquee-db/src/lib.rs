//! Marquee metadata store
//!
//! Durable persistence for banner records. The `MetadataStore` trait is the
//! seam the ingestion pipeline and query service depend on; `BannerRepository`
//! backs it with Postgres and `InMemoryBannerStore` with a process-local map.

pub mod db;

pub use db::{BannerRepository, InMemoryBannerStore, MetadataStore};
