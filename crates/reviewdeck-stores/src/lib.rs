//! App store review service clients for Reviewdeck
//!
//! This crate provides the [`ReviewService`] capability - fetch a page of
//! reviews, list apps, respond to a review, delete a response - and the two
//! vendor implementations:
//!
//! - **Apple**: App Store Connect API (`customerReviews`), ES256 JWT auth
//! - **Google Play**: Android Publisher API (`reviews`), service-account OAuth
//!
//! Clients speak vendor-native identifiers. Vendor-scoping of ids is the
//! dispatch layer's job; nothing in this crate knows about scheme prefixes.
//!
//! ## Usage
//!
//! ```ignore
//! use reviewdeck_stores::{ReviewService, apple::AppStoreReviews};
//!
//! let service = AppStoreReviews::new(credentials)?;
//! let page = service.fetch_reviews("123456789", &request).await?;
//! ```

pub mod error;
pub mod traits;

pub mod apple;
pub mod google_play;

pub use error::{Result, StoreError};
pub use traits::ReviewService;
