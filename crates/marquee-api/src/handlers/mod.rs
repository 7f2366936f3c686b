pub mod banner_upload;
pub mod banners;
pub mod public_feed;
