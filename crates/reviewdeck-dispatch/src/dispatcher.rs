//! The review dispatcher

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::{DispatchError, Result};
use reviewdeck_core::{
    AppListing, Config, ReviewPage, ReviewRequest, ReviewResponse, ScopedId, Vendor,
};
use reviewdeck_directory::AppDirectory;
use reviewdeck_stores::apple::AppStoreReviews;
use reviewdeck_stores::google_play::GooglePlayReviews;
use reviewdeck_stores::{ReviewService, StoreError};

/// Per-vendor dispatch state: either a ready service handle or nothing.
pub enum VendorSlot {
    /// Credentials were present and the client was built
    Configured(Arc<dyn ReviewService>),
    /// No credentials for this vendor; excluded from dispatch
    NotConfigured,
}

impl VendorSlot {
    /// Wrap a service
    pub fn configured(service: impl ReviewService + 'static) -> Self {
        VendorSlot::Configured(Arc::new(service))
    }

    /// The service handle, when configured
    pub fn service(&self) -> Option<&Arc<dyn ReviewService>> {
        match self {
            VendorSlot::Configured(service) => Some(service),
            VendorSlot::NotConfigured => None,
        }
    }

    /// Whether this vendor can be dispatched to
    pub fn is_configured(&self) -> bool {
        matches!(self, VendorSlot::Configured(_))
    }
}

/// Single entry point over all configured review services.
///
/// Owns the app directory (behind a lock, since the listing flow mutates it)
/// and one [`VendorSlot`] per vendor.
pub struct ReviewDispatcher {
    directory: RwLock<AppDirectory>,
    app_store: VendorSlot,
    google_play: VendorSlot,
}

impl ReviewDispatcher {
    /// Build a dispatcher from configuration.
    ///
    /// Each vendor client is constructed once; a credentials-missing failure
    /// marks that vendor [`VendorSlot::NotConfigured`] instead of failing.
    /// Only when no vendor at all is configured does construction fail, with
    /// [`DispatchError::NoCredentials`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let app_store = match &config.app_store {
            Some(credentials) => match AppStoreReviews::new(credentials.clone()) {
                Ok(service) => VendorSlot::configured(service),
                Err(StoreError::Credentials(reason)) => {
                    warn!(vendor = %Vendor::AppStore, %reason, "vendor not configured");
                    VendorSlot::NotConfigured
                }
                Err(e) => return Err(e.into()),
            },
            None => VendorSlot::NotConfigured,
        };

        let google_play = match &config.google_play {
            Some(credentials) => match GooglePlayReviews::new(credentials.clone()) {
                Ok(service) => VendorSlot::configured(service),
                Err(StoreError::Credentials(reason)) => {
                    warn!(vendor = %Vendor::GooglePlay, %reason, "vendor not configured");
                    VendorSlot::NotConfigured
                }
                Err(e) => return Err(e.into()),
            },
            None => VendorSlot::NotConfigured,
        };

        Self::with_slots(
            AppDirectory::new(config.directory_path()),
            app_store,
            google_play,
        )
    }

    /// Build a dispatcher from pre-built slots.
    ///
    /// Fails with [`DispatchError::NoCredentials`] when neither slot is
    /// configured.
    pub fn with_slots(
        directory: AppDirectory,
        app_store: VendorSlot,
        google_play: VendorSlot,
    ) -> Result<Self> {
        if !app_store.is_configured() && !google_play.is_configured() {
            return Err(DispatchError::NoCredentials);
        }

        debug!(
            app_store = app_store.is_configured(),
            google_play = google_play.is_configured(),
            "dispatcher ready"
        );

        Ok(Self {
            directory: RwLock::new(directory),
            app_store,
            google_play,
        })
    }

    fn slot(&self, vendor: Vendor) -> &VendorSlot {
        match vendor {
            Vendor::AppStore => &self.app_store,
            Vendor::GooglePlay => &self.google_play,
        }
    }

    /// Whether the given vendor can be dispatched to
    pub fn is_configured(&self, vendor: Vendor) -> bool {
        self.slot(vendor).is_configured()
    }

    /// Whether a user-named store ("app store", "apple", "android", ...) is
    /// configured. Unknown names are simply not configured.
    pub fn has_credentials(&self, store: &str) -> bool {
        Vendor::from_alias(store).is_some_and(|vendor| self.is_configured(vendor))
    }

    /// The vendors that can currently be dispatched to
    pub fn available_stores(&self) -> Vec<Vendor> {
        Vendor::all()
            .into_iter()
            .filter(|vendor| self.is_configured(*vendor))
            .collect()
    }

    async fn ensure_loaded(&self) -> Result<()> {
        let mut directory = self.directory.write().await;
        directory.ensure_loaded().await?;
        Ok(())
    }

    /// Fetch a page of reviews for an app named by a free-form query.
    ///
    /// The query is resolved against the directory first (hidden apps
    /// included - asking for a hidden app by name is explicit enough). An
    /// unresolved query falls back to format sniffing: all digits means an
    /// App Store numeric id, a dot means a Google Play package, anything
    /// else goes to whichever vendor is configured (App Store preferred).
    /// Every id in the returned page is scheme-prefixed.
    #[instrument(skip(self, request), fields(query))]
    pub async fn get_reviews(&self, query: &str, request: &ReviewRequest) -> Result<ReviewPage> {
        self.ensure_loaded().await?;

        let resolved = {
            let directory = self.directory.read().await;
            directory.resolve_for_api(query, true)
        };

        let (vendor, wire_id) = match resolved {
            Some(target) => {
                // The user asked for a known app; if its store is not set up
                // that is an error, not a cue to guess another vendor.
                if !self.is_configured(target.vendor) {
                    return Err(DispatchError::VendorNotConfigured {
                        app: target.record.name,
                        vendor: target.vendor,
                    });
                }
                debug!(vendor = %target.vendor, id = %target.api_identifier, "resolved via directory");
                (target.vendor, target.api_identifier)
            }
            None => {
                let vendor = self
                    .sniff_vendor(query)
                    .ok_or_else(|| DispatchError::UnresolvableQuery(query.to_string()))?;
                debug!(vendor = %vendor, "resolved via format sniffing");
                (vendor, query.to_string())
            }
        };

        let service = match self.slot(vendor).service() {
            Some(service) => Arc::clone(service),
            None => {
                return Err(DispatchError::VendorNotConfigured {
                    app: query.to_string(),
                    vendor,
                })
            }
        };

        let mut page = service.fetch_reviews(&wire_id, request).await?;
        scope_page(&mut page, vendor);
        Ok(page)
    }

    /// Infer a vendor from the query format.
    ///
    /// A sniffed vendor that is not configured cannot be selected: a numeric
    /// id can only ever be an App Store app, so guessing Google Play instead
    /// could never succeed (and vice versa for dotted package names).
    fn sniff_vendor(&self, query: &str) -> Option<Vendor> {
        if !query.is_empty() && query.chars().all(|c| c.is_ascii_digit()) {
            return self.is_configured(Vendor::AppStore).then_some(Vendor::AppStore);
        }
        if query.contains('.') {
            return self
                .is_configured(Vendor::GooglePlay)
                .then_some(Vendor::GooglePlay);
        }
        Vendor::all()
            .into_iter()
            .find(|vendor| self.is_configured(*vendor))
    }

    /// List apps across every configured vendor and refresh the directory.
    ///
    /// One concurrent listing call per configured vendor; a failing vendor
    /// contributes a warning instead of aborting the aggregate. Results are
    /// merged in fixed vendor order (App Store before Google Play) so the
    /// outcome does not depend on network completion order. A failing save
    /// is also a warning. Returns the full snapshot including hidden apps.
    #[instrument(skip(self))]
    pub async fn list_apps(&self) -> Result<AppListing> {
        self.ensure_loaded().await?;

        let list = |slot: &VendorSlot| {
            let service = slot.service().cloned();
            async move {
                match service {
                    Some(service) => Some(service.list_apps().await),
                    None => None,
                }
            }
        };

        let (app_store_result, google_play_result) =
            tokio::join!(list(&self.app_store), list(&self.google_play));

        let mut warnings = Vec::new();
        let mut directory = self.directory.write().await;

        for (vendor, result) in [
            (Vendor::AppStore, app_store_result),
            (Vendor::GooglePlay, google_play_result),
        ] {
            match result {
                None => {}
                Some(Ok(listing)) => {
                    warnings.extend(listing.warnings);
                    if !listing.apps.is_empty() {
                        directory.merge_from_vendor_listing(listing.apps, vendor);
                    }
                }
                Some(Err(e)) => {
                    warn!(vendor = %vendor, error = %e, "listing failed");
                    warnings.push(format!("{}: {}", vendor, e));
                }
            }
        }

        if let Err(e) = directory.save().await {
            warn!(error = %e, "failed to save app directory");
            warnings.push(format!("Failed to save app directory: {}", e));
        }

        info!(count = directory.len(), warnings = warnings.len(), "listed apps");
        Ok(AppListing {
            apps: directory.get_all(true),
            warnings,
        })
    }

    /// Publish a developer response on a scoped review id.
    ///
    /// The returned response id is re-prefixed with the vendor scheme.
    #[instrument(skip(self, body), fields(scoped_id))]
    pub async fn respond_to_review(&self, scoped_id: &str, body: &str) -> Result<ReviewResponse> {
        let scoped = ScopedId::parse(scoped_id)?;
        let service = self.configured_service(&scoped, scoped_id)?;

        let mut response = service.respond_to_review(scoped.native(), body).await?;
        response.id = ScopedId::new(scoped.vendor(), response.id).to_string();
        Ok(response)
    }

    /// Delete a developer response named by a scoped response id.
    ///
    /// A vendor capability gap ([`StoreError::NotSupported`]) propagates to
    /// the caller unchanged.
    #[instrument(skip(self), fields(scoped_id))]
    pub async fn delete_review_response(&self, scoped_id: &str) -> Result<()> {
        let scoped = ScopedId::parse(scoped_id)?;
        let service = self.configured_service(&scoped, scoped_id)?;

        service.delete_response(scoped.native()).await?;
        Ok(())
    }

    fn configured_service(
        &self,
        scoped: &ScopedId,
        raw_id: &str,
    ) -> Result<Arc<dyn ReviewService>> {
        match self.slot(scoped.vendor()).service() {
            Some(service) => Ok(Arc::clone(service)),
            None => Err(DispatchError::VendorNotConfigured {
                app: raw_id.to_string(),
                vendor: scoped.vendor(),
            }),
        }
    }
}

/// Rewrite every review id and nested developer-response id with the
/// vendor's scheme prefix.
fn scope_page(page: &mut ReviewPage, vendor: Vendor) {
    for review in &mut page.reviews {
        review.id = ScopedId::new(vendor, std::mem::take(&mut review.id)).to_string();
        if let Some(response) = &mut review.response {
            response.id = ScopedId::new(vendor, std::mem::take(&mut response.id)).to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use reviewdeck_core::{AppRecord, Pagination, Review};
    use reviewdeck_stores::error::Result as StoreResult;

    /// Scripted review service that records the ids it is called with
    struct MockService {
        mock_vendor: Vendor,
        fetched_app_ids: Mutex<Vec<String>>,
        responded: Mutex<Vec<(String, String)>>,
        deleted: Mutex<Vec<String>>,
        reviews: Vec<Review>,
        listing: StoreResult<AppListing>,
        response_id: String,
    }

    impl MockService {
        fn new(vendor: Vendor) -> Self {
            Self {
                mock_vendor: vendor,
                fetched_app_ids: Mutex::new(Vec::new()),
                responded: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
                reviews: Vec::new(),
                listing: Ok(AppListing::default()),
                response_id: "response-1".to_string(),
            }
        }

        fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
            self.reviews = reviews;
            self
        }

        fn with_listing(mut self, listing: StoreResult<AppListing>) -> Self {
            self.listing = listing;
            self
        }

        fn with_response_id(mut self, id: &str) -> Self {
            self.response_id = id.to_string();
            self
        }
    }

    fn review(id: &str) -> Review {
        Review {
            id: id.to_string(),
            rating: 4,
            title: None,
            body: "body".to_string(),
            reviewer: None,
            territory: None,
            app_version: None,
            created_at: None,
            response: None,
        }
    }

    #[async_trait::async_trait]
    impl ReviewService for MockService {
        fn name(&self) -> &str {
            "Mock"
        }

        fn vendor(&self) -> Vendor {
            self.mock_vendor
        }

        async fn fetch_reviews(
            &self,
            app_id: &str,
            _request: &ReviewRequest,
        ) -> StoreResult<ReviewPage> {
            self.fetched_app_ids
                .lock()
                .unwrap()
                .push(app_id.to_string());
            Ok(ReviewPage {
                reviews: self.reviews.clone(),
                pagination: Pagination::default(),
                warnings: Vec::new(),
            })
        }

        async fn list_apps(&self) -> StoreResult<AppListing> {
            match &self.listing {
                Ok(listing) => Ok(listing.clone()),
                Err(_) => Err(StoreError::Other("listing exploded".to_string())),
            }
        }

        async fn respond_to_review(
            &self,
            review_id: &str,
            body: &str,
        ) -> StoreResult<ReviewResponse> {
            self.responded
                .lock()
                .unwrap()
                .push((review_id.to_string(), body.to_string()));
            Ok(ReviewResponse {
                id: self.response_id.clone(),
                body: body.to_string(),
                modified_at: None,
            })
        }

        async fn delete_response(&self, response_id: &str) -> StoreResult<()> {
            self.deleted.lock().unwrap().push(response_id.to_string());
            match self.mock_vendor {
                Vendor::GooglePlay => Err(StoreError::NotSupported(
                    "Google Play does not support deleting developer replies".to_string(),
                )),
                Vendor::AppStore => Ok(()),
            }
        }
    }

    fn empty_directory() -> (TempDir, AppDirectory) {
        let temp = TempDir::new().unwrap();
        let directory = AppDirectory::new(temp.path().join("apps.json"));
        (temp, directory)
    }

    fn play_record(native_id: &str, bundle: &str, name: &str) -> AppRecord {
        let mut record = AppRecord::new(Vendor::GooglePlay, native_id, name);
        record.bundle_id = Some(bundle.to_string());
        record
    }

    #[test]
    fn test_construction_requires_some_vendor() {
        let (_temp, directory) = empty_directory();
        let err = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::NotConfigured,
            VendorSlot::NotConfigured,
        )
        .err()
        .unwrap();
        assert!(matches!(err, DispatchError::NoCredentials));
    }

    #[test]
    fn test_introspection() {
        let (_temp, directory) = empty_directory();
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::configured(MockService::new(Vendor::AppStore)),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        assert!(dispatcher.has_credentials("app store"));
        assert!(dispatcher.has_credentials("Apple"));
        assert!(!dispatcher.has_credentials("google play"));
        assert!(!dispatcher.has_credentials("unknown"));
        assert_eq!(dispatcher.available_stores(), vec![Vendor::AppStore]);
    }

    #[tokio::test]
    async fn test_numeric_query_sniffs_to_app_store() {
        let (_temp, directory) = empty_directory();
        let apple = Arc::new(MockService::new(Vendor::AppStore).with_reviews(vec![review("r1")]));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple.clone()),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let page = dispatcher
            .get_reviews("123456789", &ReviewRequest::default())
            .await
            .unwrap();

        assert_eq!(
            *apple.fetched_app_ids.lock().unwrap(),
            vec!["123456789".to_string()]
        );
        assert_eq!(page.reviews[0].id, "as:r1");
    }

    #[tokio::test]
    async fn test_directory_hit_dispatches_with_wire_id() {
        let (_temp, mut directory) = empty_directory();
        directory.add_or_update(play_record("X1", "com.example.app", "Example"));
        directory.save().await.unwrap();

        let google = Arc::new(MockService::new(Vendor::GooglePlay));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::NotConfigured,
            VendorSlot::Configured(google.clone()),
        )
        .unwrap();

        dispatcher
            .get_reviews("Example", &ReviewRequest::default())
            .await
            .unwrap();

        assert_eq!(
            *google.fetched_app_ids.lock().unwrap(),
            vec!["com.example.app".to_string()]
        );
    }

    #[tokio::test]
    async fn test_known_app_on_unconfigured_vendor_fails_without_fallback() {
        let (_temp, mut directory) = empty_directory();
        directory.add_or_update(play_record("X1", "com.example.app", "Example"));
        directory.save().await.unwrap();

        let apple = Arc::new(MockService::new(Vendor::AppStore));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple.clone()),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let err = dispatcher
            .get_reviews("com.example.app", &ReviewRequest::default())
            .await
            .err()
            .unwrap();

        match &err {
            DispatchError::VendorNotConfigured { app, vendor } => {
                assert_eq!(app, "Example");
                assert_eq!(*vendor, Vendor::GooglePlay);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Google Play"));
        // No silent fall-through to the configured vendor
        assert!(apple.fetched_app_ids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_query_without_app_store_is_unresolvable() {
        let (_temp, directory) = empty_directory();
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::NotConfigured,
            VendorSlot::configured(MockService::new(Vendor::GooglePlay)),
        )
        .unwrap();

        let err = dispatcher
            .get_reviews("123456789", &ReviewRequest::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::UnresolvableQuery(_)));
        assert!(err.to_string().contains("apps sync"));
    }

    #[tokio::test]
    async fn test_name_query_prefers_app_store_on_tie() {
        let (_temp, directory) = empty_directory();
        let apple = Arc::new(MockService::new(Vendor::AppStore));
        let google = Arc::new(MockService::new(Vendor::GooglePlay));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple.clone()),
            VendorSlot::Configured(google.clone()),
        )
        .unwrap();

        dispatcher
            .get_reviews("someapp", &ReviewRequest::default())
            .await
            .unwrap();

        assert_eq!(apple.fetched_app_ids.lock().unwrap().len(), 1);
        assert!(google.fetched_app_ids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scoped_ids_cover_nested_responses() {
        let (_temp, directory) = empty_directory();
        let mut with_response = review("r1");
        with_response.response = Some(ReviewResponse {
            id: "resp-9".to_string(),
            body: "thanks".to_string(),
            modified_at: None,
        });
        let apple =
            Arc::new(MockService::new(Vendor::AppStore).with_reviews(vec![with_response]));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let page = dispatcher
            .get_reviews("123", &ReviewRequest::default())
            .await
            .unwrap();

        assert_eq!(page.reviews[0].id, "as:r1");
        assert_eq!(page.reviews[0].response.as_ref().unwrap().id, "as:resp-9");
    }

    #[tokio::test]
    async fn test_list_apps_isolates_vendor_failure_and_saves() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("apps.json");
        let directory = AppDirectory::new(&path);

        let apple_listing = AppListing {
            apps: vec![
                AppRecord::new(Vendor::AppStore, "1", "Alpha"),
                AppRecord::new(Vendor::AppStore, "2", "Beta"),
                AppRecord::new(Vendor::AppStore, "3", "Gamma"),
            ],
            warnings: Vec::new(),
        };
        let apple =
            Arc::new(MockService::new(Vendor::AppStore).with_listing(Ok(apple_listing)));
        let google = Arc::new(
            MockService::new(Vendor::GooglePlay)
                .with_listing(Err(StoreError::Other("boom".to_string()))),
        );

        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple),
            VendorSlot::Configured(google),
        )
        .unwrap();

        let listing = dispatcher.list_apps().await.unwrap();

        assert_eq!(listing.apps.len(), 3);
        assert_eq!(listing.warnings.len(), 1);
        assert!(listing.warnings[0].contains("Google Play"));
        // Save still happened despite the failing vendor
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_list_apps_merges_and_preserves_local_metadata() {
        let (_temp, mut directory) = empty_directory();
        let mut existing = AppRecord::new(Vendor::AppStore, "1", "Alpha");
        existing.notes = Some("keep me".to_string());
        directory.add_or_update(existing);
        directory.save().await.unwrap();

        let apple = Arc::new(MockService::new(Vendor::AppStore).with_listing(Ok(AppListing {
            apps: vec![AppRecord::new(Vendor::AppStore, "1", "Alpha Renamed")],
            warnings: Vec::new(),
        })));

        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let listing = dispatcher.list_apps().await.unwrap();
        assert_eq!(listing.apps.len(), 1);
        assert_eq!(listing.apps[0].name, "Alpha Renamed");
        assert_eq!(listing.apps[0].notes.as_deref(), Some("keep me"));
    }

    #[tokio::test]
    async fn test_respond_routes_native_id_and_rescopes() {
        let (_temp, directory) = empty_directory();
        let apple = Arc::new(MockService::new(Vendor::AppStore).with_response_id("555"));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::Configured(apple.clone()),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let response = dispatcher
            .respond_to_review("as:999", "Thanks!")
            .await
            .unwrap();

        assert_eq!(
            *apple.responded.lock().unwrap(),
            vec![("999".to_string(), "Thanks!".to_string())]
        );
        assert_eq!(response.id, "as:555");
    }

    #[tokio::test]
    async fn test_respond_to_unconfigured_vendor_fails() {
        let (_temp, directory) = empty_directory();
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::configured(MockService::new(Vendor::AppStore)),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let err = dispatcher
            .respond_to_review("gp:com.example.app/r1", "Thanks!")
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DispatchError::VendorNotConfigured {
                vendor: Vendor::GooglePlay,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_with_malformed_id() {
        let (_temp, directory) = empty_directory();
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::configured(MockService::new(Vendor::AppStore)),
            VendorSlot::NotConfigured,
        )
        .unwrap();

        let err = dispatcher
            .delete_review_response("nocolon")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::MalformedId(_)));
        assert!(err.to_string().contains("<scheme>:<id>"));
        assert!(err.to_string().contains("nocolon"));
    }

    #[tokio::test]
    async fn test_delete_not_supported_propagates() {
        let (_temp, directory) = empty_directory();
        let google = Arc::new(MockService::new(Vendor::GooglePlay));
        let dispatcher = ReviewDispatcher::with_slots(
            directory,
            VendorSlot::NotConfigured,
            VendorSlot::Configured(google.clone()),
        )
        .unwrap();

        let err = dispatcher
            .delete_review_response("gp:com.example.app/r1")
            .await
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DispatchError::Store(StoreError::NotSupported(_))
        ));
        // The vendor saw the native id, without the scheme prefix
        assert_eq!(
            *google.deleted.lock().unwrap(),
            vec!["com.example.app/r1".to_string()]
        );
    }
}
