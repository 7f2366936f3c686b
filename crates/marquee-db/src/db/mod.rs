//! Database repositories for data access layer

mod banner;
mod memory;
mod store;

pub use banner::BannerRepository;
pub use memory::InMemoryBannerStore;
pub use store::MetadataStore;
