//! Data models for the application
//!
//! Banner records and their API representations, plus the transient values
//! exchanged with the staged-upload provider.

mod banner;
mod staging;

pub use banner::*;
pub use staging::*;
