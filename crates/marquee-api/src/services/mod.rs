pub mod banners;
pub mod ingest;

pub use banners::BannerService;
pub use ingest::{BufferedUpload, IngestError, IngestPhase, IngestionPipeline};
