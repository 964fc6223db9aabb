//! Apple App Store Connect integration

pub mod connect;

pub use connect::AppStoreReviews;
