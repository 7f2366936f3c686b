//! Marquee Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! banner lifecycle classifier shared across all Marquee components.

pub mod backends;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;

// Re-export commonly used types
pub use backends::{MetadataBackend, StagingBackend};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use lifecycle::{classify, today_in, LifecycleStatus};
