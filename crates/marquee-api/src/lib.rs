//! Marquee API
//!
//! HTTP surface for banner ingestion and lifecycle queries: the admin API
//! under `/api`, the storefront feed under `/apps`, health and OpenAPI docs.

mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
