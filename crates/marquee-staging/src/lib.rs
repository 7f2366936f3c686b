//! Marquee Staging Library
//!
//! Adapters for the staged-upload protocol of object-storage providers. The
//! `StagingClient` trait is implemented for the Shopify Admin API and for a
//! local directory used in development.

pub mod factory;
#[cfg(feature = "staging-local")]
pub mod local;
#[cfg(feature = "staging-shopify")]
pub mod shopify;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_staging_client;
#[cfg(feature = "staging-local")]
pub use local::LocalStagingClient;
pub use marquee_core::StagingBackend;
#[cfg(feature = "staging-shopify")]
pub use shopify::ShopifyStagingClient;
pub use traits::{ByteSource, StagingClient, StagingError, StagingResult};
