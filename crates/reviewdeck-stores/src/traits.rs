//! Review service capability trait

use crate::error::Result;
use reviewdeck_core::{AppListing, ReviewPage, ReviewRequest, ReviewResponse, Vendor};

/// Capability contract every vendor review client satisfies.
///
/// All identifiers at this boundary are vendor-native: the numeric app id /
/// review id for the App Store, the package name / composite review id for
/// Google Play. The dispatch layer owns scoping.
#[async_trait::async_trait]
pub trait ReviewService: Send + Sync {
    /// Human-readable service name
    fn name(&self) -> &str;

    /// Which vendor this service talks to
    fn vendor(&self) -> Vendor;

    /// Fetch one page of customer reviews for an app
    async fn fetch_reviews(&self, app_id: &str, request: &ReviewRequest) -> Result<ReviewPage>;

    /// List the apps this account can see.
    ///
    /// A vendor that cannot enumerate apps returns what it knows (possibly
    /// nothing) plus warnings, rather than failing.
    async fn list_apps(&self) -> Result<AppListing>;

    /// Publish (or replace) the developer response on a review
    async fn respond_to_review(&self, review_id: &str, body: &str) -> Result<ReviewResponse>;

    /// Delete a developer response.
    ///
    /// Fails with [`StoreError::NotSupported`](crate::StoreError::NotSupported)
    /// on vendors without that capability.
    async fn delete_response(&self, response_id: &str) -> Result<()>;
}
