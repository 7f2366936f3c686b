//! Route prefixes and request limits

/// Admin API base path (authenticated)
pub const API_BASE: &str = "/api";

/// Public storefront feed base path (unauthenticated)
pub const APPS_BASE: &str = "/apps/banner-api";

/// Multipart field carrying the banner file
pub const BANNER_FIELD: &str = "banner";

/// Requests processed concurrently before callers queue
pub const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Extra body allowance for the multipart envelope and text fields
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
