//! App Store Connect customer review client
//!
//! Talks to the App Store Connect API (`customerReviews`,
//! `customerReviewResponses`, `apps`) with ES256 JWT authentication.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::traits::ReviewService;
use reviewdeck_core::config::AppStoreCredentials;
use reviewdeck_core::{
    AppListing, AppRecord, Pagination, Review, ReviewPage, ReviewRequest, ReviewResponse,
    SortOrder, Vendor,
};

const API_BASE_URL: &str = "https://api.appstoreconnect.apple.com/v1";

/// JWT claims for App Store Connect API
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    iat: i64,
    exp: i64,
    aud: String,
}

/// Cached JWT and its expiry
#[derive(Debug, Default)]
struct TokenCache {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// App Store Connect review client
pub struct AppStoreReviews {
    credentials: AppStoreCredentials,
    client: Client,
    token_cache: RwLock<TokenCache>,
}

impl AppStoreReviews {
    /// Create a new client.
    ///
    /// Fails with [`StoreError::Credentials`] when any credential field is
    /// empty; the key itself is only read when the first token is minted.
    pub fn new(credentials: AppStoreCredentials) -> Result<Self> {
        if credentials.key_id.trim().is_empty()
            || credentials.issuer_id.trim().is_empty()
            || credentials.key.trim().is_empty()
        {
            return Err(StoreError::Credentials(
                "App Store Connect key_id, issuer_id and key are all required".to_string(),
            ));
        }

        Ok(Self {
            credentials,
            client: Client::new(),
            token_cache: RwLock::new(TokenCache::default()),
        })
    }

    /// Get a bearer token, minting a fresh JWT when the cached one is near
    /// expiry (5 minute margin on a 20 minute token).
    async fn bearer_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let (Some(token), Some(expires)) = (&cache.token, cache.expires_at) {
                if Utc::now() < expires - Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        let mut cache = self.token_cache.write().await;
        // Another task may have refreshed while we waited for the lock
        if let (Some(token), Some(expires)) = (&cache.token, cache.expires_at) {
            if Utc::now() < expires - Duration::minutes(5) {
                return Ok(token.clone());
            }
        }

        let now = Utc::now();
        let exp = now + Duration::minutes(20);

        let claims = Claims {
            iss: self.credentials.issuer_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            aud: "appstoreconnect-v1".to_string(),
        };

        // The key field is either a path to the .p8 file or the PEM itself
        let key_content = if Path::new(&self.credentials.key).exists() {
            tokio::fs::read_to_string(&self.credentials.key)
                .await
                .map_err(|e| StoreError::Credentials(format!("Failed to read API key: {}", e)))?
        } else {
            self.credentials.key.clone()
        };

        let encoding_key = EncodingKey::from_ec_pem(key_content.as_bytes())
            .map_err(|e| StoreError::Credentials(format!("Invalid API key: {}", e)))?;

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.credentials.key_id.clone());

        let token = encode(&header, &claims, &encoding_key)?;

        cache.token = Some(token.clone());
        cache.expires_at = Some(exp);

        Ok(token)
    }

    /// Make an authenticated API request
    async fn api_request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let token = self.bearer_token().await?;

        debug!("API request: {} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let result = response.json().await?;
        Ok(result)
    }

    /// Make an API request that returns no content
    async fn api_request_no_content(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let token = self.bearer_token().await?;

        debug!("API request (no content): {} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl ReviewService for AppStoreReviews {
    fn name(&self) -> &str {
        "App Store Connect"
    }

    fn vendor(&self) -> Vendor {
        Vendor::AppStore
    }

    #[instrument(skip(self, request), fields(app_id))]
    async fn fetch_reviews(&self, app_id: &str, request: &ReviewRequest) -> Result<ReviewPage> {
        let mut warnings = Vec::new();

        let mut url = format!(
            "{}/apps/{}/customerReviews?include=response&limit={}",
            API_BASE_URL,
            app_id,
            request.limit.clamp(1, 200)
        );

        match sort_param(request.sort) {
            Some(sort) => url.push_str(&format!("&sort={}", sort)),
            None => warnings.push(
                "App Store Connect does not support most-helpful ordering; returning newest first"
                    .to_string(),
            ),
        }

        if let Some(country) = &request.country {
            url.push_str(&format!("&filter[territory]={}", country.to_uppercase()));
        }

        if let Some(cursor) = &request.cursor {
            url.push_str(&format!("&cursor={}", cursor));
        }

        let response: CustomerReviewsResponse = self
            .api_request(reqwest::Method::GET, &url, None)
            .await?;

        Ok(page_from_reviews_response(response, warnings))
    }

    #[instrument(skip(self))]
    async fn list_apps(&self) -> Result<AppListing> {
        let mut apps = Vec::new();
        let mut url = format!(
            "{}/apps?limit=200&include=appStoreVersions&fields[appStoreVersions]=versionString,platform,appStoreState",
            API_BASE_URL
        );

        loop {
            let response: AppsResponse = self
                .api_request(reqwest::Method::GET, &url, None)
                .await?;

            let next = response.links.as_ref().and_then(|l| l.next.clone());
            apps.extend(records_from_apps_response(response));

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        debug!(count = apps.len(), "listed App Store apps");
        Ok(AppListing {
            apps,
            warnings: Vec::new(),
        })
    }

    #[instrument(skip(self, body), fields(review_id))]
    async fn respond_to_review(&self, review_id: &str, body: &str) -> Result<ReviewResponse> {
        #[derive(Deserialize)]
        struct ResponseEnvelope {
            data: ResponseData,
        }

        #[derive(Deserialize)]
        struct ResponseData {
            id: String,
            attributes: ResponseAttributes,
        }

        let payload = serde_json::json!({
            "data": {
                "type": "customerReviewResponses",
                "attributes": {
                    "responseBody": body
                },
                "relationships": {
                    "review": {
                        "data": {
                            "type": "customerReviews",
                            "id": review_id
                        }
                    }
                }
            }
        });

        let url = format!("{}/customerReviewResponses", API_BASE_URL);
        let response: ResponseEnvelope = self
            .api_request(reqwest::Method::POST, &url, Some(payload))
            .await?;

        Ok(ReviewResponse {
            id: response.data.id,
            body: response.data.attributes.response_body.unwrap_or_default(),
            modified_at: response
                .data
                .attributes
                .last_modified_date
                .as_deref()
                .and_then(parse_datetime),
        })
    }

    #[instrument(skip(self), fields(response_id))]
    async fn delete_response(&self, response_id: &str) -> Result<()> {
        let url = format!("{}/customerReviewResponses/{}", API_BASE_URL, response_id);
        self.api_request_no_content(reqwest::Method::DELETE, &url, None)
            .await
    }
}

/// App Store Connect sort parameter for a requested order.
///
/// `MostHelpful` has no upstream equivalent and yields `None`.
fn sort_param(sort: SortOrder) -> Option<&'static str> {
    match sort {
        SortOrder::NewestFirst => Some("-createdDate"),
        SortOrder::OldestFirst => Some("createdDate"),
        SortOrder::HighestRatingFirst => Some("-rating"),
        SortOrder::LowestRatingFirst => Some("rating"),
        SortOrder::MostHelpful => None,
    }
}

/// Convert a non-success response into a structured error.
///
/// Parses the JSON:API error body when present; 401/403 map to auth failures
/// and 429 to rate limiting.
async fn error_from_response(response: reqwest::Response) -> StoreError {
    let status = response.status();

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return StoreError::RateLimited { retry_after };
    }

    let text = response.text().await.unwrap_or_default();

    #[derive(Deserialize)]
    struct ErrorBody {
        errors: Vec<ErrorEntry>,
    }

    #[derive(Deserialize)]
    struct ErrorEntry {
        code: Option<String>,
        detail: Option<String>,
        title: Option<String>,
    }

    let (vendor_code, detail) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => match body.errors.into_iter().next() {
            Some(entry) => (
                entry.code,
                entry.detail.or(entry.title).unwrap_or_default(),
            ),
            None => (None, text),
        },
        Err(_) => (None, text),
    };

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return StoreError::Auth(detail);
    }

    StoreError::Api {
        status: status.as_u16(),
        vendor_code,
        detail,
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

// -----------------------------------------------------------------------------
// Wire shapes
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CustomerReviewsResponse {
    data: Vec<ReviewData>,
    #[serde(default)]
    included: Vec<IncludedResponse>,
    #[serde(default)]
    links: Option<PagedLinks>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct ReviewData {
    id: String,
    attributes: ReviewAttributes,
    #[serde(default)]
    relationships: Option<ReviewRelationships>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewAttributes {
    rating: u8,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    reviewer_nickname: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
    #[serde(default)]
    territory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReviewRelationships {
    #[serde(default)]
    response: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    #[serde(default)]
    data: Option<IdRef>,
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IncludedResponse {
    id: String,
    attributes: ResponseAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseAttributes {
    #[serde(default)]
    response_body: Option<String>,
    #[serde(default)]
    last_modified_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagedLinks {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    total: Option<u64>,
}

/// Build the caller-facing page from the wire response
fn page_from_reviews_response(
    response: CustomerReviewsResponse,
    warnings: Vec<String>,
) -> ReviewPage {
    let responses: std::collections::HashMap<&str, &IncludedResponse> = response
        .included
        .iter()
        .map(|r| (r.id.as_str(), r))
        .collect();

    let reviews = response
        .data
        .iter()
        .map(|data| {
            let response_ref = data
                .relationships
                .as_ref()
                .and_then(|r| r.response.as_ref())
                .and_then(|r| r.data.as_ref())
                .and_then(|id_ref| responses.get(id_ref.id.as_str()));

            Review {
                id: data.id.clone(),
                rating: data.attributes.rating,
                title: data.attributes.title.clone(),
                body: data.attributes.body.clone().unwrap_or_default(),
                reviewer: data.attributes.reviewer_nickname.clone(),
                territory: data.attributes.territory.clone(),
                app_version: None,
                created_at: data
                    .attributes
                    .created_date
                    .as_deref()
                    .and_then(parse_datetime),
                response: response_ref.map(|included| ReviewResponse {
                    id: included.id.clone(),
                    body: included.attributes.response_body.clone().unwrap_or_default(),
                    modified_at: included
                        .attributes
                        .last_modified_date
                        .as_deref()
                        .and_then(parse_datetime),
                }),
            }
        })
        .collect();

    let next_cursor = response
        .links
        .as_ref()
        .and_then(|l| l.next.as_deref())
        .and_then(cursor_from_link);

    ReviewPage {
        reviews,
        pagination: Pagination {
            total_count: response.meta.and_then(|m| m.paging).and_then(|p| p.total),
            has_more: next_cursor.is_some(),
            next_cursor,
            // The API exposes no previous link
            previous_cursor: None,
        },
        warnings,
    }
}

/// Extract the `cursor` query parameter from a pagination link
fn cursor_from_link(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "cursor")
        .map(|(_, value)| value.into_owned())
}

#[derive(Debug, Deserialize)]
struct AppsResponse {
    data: Vec<AppData>,
    #[serde(default)]
    included: Vec<VersionData>,
    #[serde(default)]
    links: Option<PagedLinks>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    id: String,
    attributes: AppAttributes,
    #[serde(default)]
    relationships: Option<AppRelationships>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    bundle_id: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    primary_locale: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppRelationships {
    #[serde(default)]
    app_store_versions: Option<RelationshipList>,
}

#[derive(Debug, Deserialize)]
struct RelationshipList {
    #[serde(default)]
    data: Vec<IdRef>,
}

#[derive(Debug, Deserialize)]
struct VersionData {
    id: String,
    attributes: VersionAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionAttributes {
    #[serde(default)]
    version_string: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    app_store_state: Option<String>,
}

const READY_FOR_SALE: &str = "READY_FOR_SALE";

/// Build app records from one page of the apps listing
fn records_from_apps_response(response: AppsResponse) -> Vec<AppRecord> {
    let versions: std::collections::HashMap<&str, &VersionData> = response
        .included
        .iter()
        .map(|v| (v.id.as_str(), v))
        .collect();

    response
        .data
        .iter()
        .map(|app| {
            let app_versions: Vec<&VersionData> = app
                .relationships
                .as_ref()
                .and_then(|r| r.app_store_versions.as_ref())
                .map(|list| {
                    list.data
                        .iter()
                        .filter_map(|id_ref| versions.get(id_ref.id.as_str()).copied())
                        .collect()
                })
                .unwrap_or_default();

            let mut platforms = Vec::new();
            for version in &app_versions {
                if let Some(platform) = &version.attributes.platform {
                    if !platforms.contains(platform) {
                        platforms.push(platform.clone());
                    }
                }
            }

            let live = app_versions
                .iter()
                .find(|v| v.attributes.app_store_state.as_deref() == Some(READY_FOR_SALE));

            let current_version = live
                .or(app_versions.first())
                .and_then(|v| v.attributes.version_string.clone());

            let is_available = if app_versions.is_empty() {
                None
            } else {
                Some(live.is_some())
            };

            let mut record = AppRecord::new(
                Vendor::AppStore,
                app.id.clone(),
                app.attributes
                    .name
                    .clone()
                    .unwrap_or_else(|| app.id.clone()),
            );
            record.bundle_id = app.attributes.bundle_id.clone();
            record.sku = app.attributes.sku.clone();
            record.primary_locale = app.attributes.primary_locale.clone();
            record.platforms = platforms;
            record.current_version = current_version;
            record.is_available = is_available;
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_param_mapping() {
        assert_eq!(sort_param(SortOrder::NewestFirst), Some("-createdDate"));
        assert_eq!(sort_param(SortOrder::OldestFirst), Some("createdDate"));
        assert_eq!(sort_param(SortOrder::HighestRatingFirst), Some("-rating"));
        assert_eq!(sort_param(SortOrder::LowestRatingFirst), Some("rating"));
        assert_eq!(sort_param(SortOrder::MostHelpful), None);
    }

    #[test]
    fn test_cursor_from_link() {
        let link = "https://api.appstoreconnect.apple.com/v1/apps/1/customerReviews?cursor=AoJ4&limit=50";
        assert_eq!(cursor_from_link(link), Some("AoJ4".to_string()));
        assert_eq!(cursor_from_link("https://example.com/?limit=50"), None);
        assert_eq!(cursor_from_link("not a url"), None);
    }

    #[test]
    fn test_new_rejects_empty_credentials() {
        let result = AppStoreReviews::new(AppStoreCredentials {
            key_id: String::new(),
            issuer_id: "issuer".to_string(),
            key: "key".to_string(),
        });
        assert!(matches!(result, Err(StoreError::Credentials(_))));
    }

    #[test]
    fn test_page_from_reviews_response() {
        let raw = r#"{
            "data": [
                {
                    "type": "customerReviews",
                    "id": "r-1",
                    "attributes": {
                        "rating": 5,
                        "title": "Great",
                        "body": "Works well",
                        "reviewerNickname": "sam",
                        "createdDate": "2024-03-01T12:00:00Z",
                        "territory": "USA"
                    },
                    "relationships": {
                        "response": { "data": { "type": "customerReviewResponses", "id": "resp-1" } }
                    }
                },
                {
                    "type": "customerReviews",
                    "id": "r-2",
                    "attributes": {
                        "rating": 1,
                        "body": "Crashes",
                        "territory": "GBR"
                    },
                    "relationships": {
                        "response": { "data": null }
                    }
                }
            ],
            "included": [
                {
                    "type": "customerReviewResponses",
                    "id": "resp-1",
                    "attributes": {
                        "responseBody": "Thanks!",
                        "lastModifiedDate": "2024-03-02T09:30:00Z"
                    }
                }
            ],
            "links": {
                "self": "https://api.appstoreconnect.apple.com/v1/apps/1/customerReviews",
                "next": "https://api.appstoreconnect.apple.com/v1/apps/1/customerReviews?cursor=NEXT"
            },
            "meta": { "paging": { "total": 42, "limit": 2 } }
        }"#;

        let response: CustomerReviewsResponse = serde_json::from_str(raw).unwrap();
        let page = page_from_reviews_response(response, vec![]);

        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.reviews[0].id, "r-1");
        assert_eq!(page.reviews[0].rating, 5);
        assert_eq!(page.reviews[0].reviewer.as_deref(), Some("sam"));
        let response = page.reviews[0].response.as_ref().unwrap();
        assert_eq!(response.id, "resp-1");
        assert_eq!(response.body, "Thanks!");

        assert!(page.reviews[1].response.is_none());
        assert!(page.reviews[1].title.is_none());

        assert_eq!(page.pagination.total_count, Some(42));
        assert_eq!(page.pagination.next_cursor.as_deref(), Some("NEXT"));
        assert!(page.pagination.has_more);
    }

    #[test]
    fn test_records_from_apps_response() {
        let raw = r#"{
            "data": [
                {
                    "type": "apps",
                    "id": "123456789",
                    "attributes": {
                        "name": "Example",
                        "bundleId": "com.example.app",
                        "sku": "EXAMPLE1",
                        "primaryLocale": "en-US"
                    },
                    "relationships": {
                        "appStoreVersions": {
                            "data": [ { "type": "appStoreVersions", "id": "v-1" } ]
                        }
                    }
                }
            ],
            "included": [
                {
                    "type": "appStoreVersions",
                    "id": "v-1",
                    "attributes": {
                        "versionString": "2.1.0",
                        "platform": "IOS",
                        "appStoreState": "READY_FOR_SALE"
                    }
                }
            ]
        }"#;

        let response: AppsResponse = serde_json::from_str(raw).unwrap();
        let records = records_from_apps_response(response);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.native_id, "123456789");
        assert_eq!(record.bundle_id.as_deref(), Some("com.example.app"));
        assert_eq!(record.vendor, Vendor::AppStore);
        assert_eq!(record.platforms, vec!["IOS".to_string()]);
        assert_eq!(record.current_version.as_deref(), Some("2.1.0"));
        assert_eq!(record.is_available, Some(true));
    }
}
