//! Banner ingestion: buffering incoming files and driving them through the
//! staged-upload protocol into the metadata store.

mod buffer;
mod pipeline;

pub use buffer::BufferedUpload;
pub use pipeline::{IngestError, IngestPhase, IngestionPipeline};
