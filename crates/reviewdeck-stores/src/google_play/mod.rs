//! Google Play review client
//!
//! Talks to the Android Publisher API (`reviews.list`, `reviews.reply`) with
//! service-account OAuth2 authentication.
//!
//! ## Review identifiers
//!
//! The reply endpoint needs the package name as well as the review id, and
//! callers hold only a single id string. Native review ids emitted by this
//! client are therefore composite - `"{package}/{reviewId}"` - and split back
//! apart on the way in. The composite id doubles as the response id, because
//! the API has no standalone response resource.
//!
//! ## Capability gaps
//!
//! The Android Publisher API returns reviews newest-first only, has no
//! territory filter, cannot delete a developer reply, and cannot enumerate
//! the account's apps. Sort orders other than newest-first are applied within
//! the fetched page (with a warning); deletion reports
//! [`StoreError::NotSupported`]; the app listing is seeded from the
//! configured package names.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::{Result, StoreError};
use crate::traits::ReviewService;
use reviewdeck_core::config::GooglePlayCredentials;
use reviewdeck_core::{
    AppListing, AppRecord, Pagination, Review, ReviewPage, ReviewRequest, ReviewResponse,
    SortOrder, Vendor,
};

const API_BASE_URL: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

/// The reviews endpoint caps maxResults at 100
const MAX_PAGE_SIZE: usize = 100;

/// Google service account credentials
#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
}

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached access token and its expiry
#[derive(Debug, Default)]
struct TokenCache {
    access_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Google Play review client
pub struct GooglePlayReviews {
    credentials: GooglePlayCredentials,
    client: Client,
    token_cache: RwLock<TokenCache>,
    service_account: ServiceAccountKey,
}

impl GooglePlayReviews {
    /// Create a new client, loading the service account key file.
    ///
    /// A missing or unparseable key file is a credentials problem and fails
    /// with [`StoreError::Credentials`].
    pub fn new(credentials: GooglePlayCredentials) -> Result<Self> {
        let key_content =
            std::fs::read_to_string(&credentials.service_account_key).map_err(|e| {
                StoreError::Credentials(format!(
                    "Failed to read service account key {}: {}",
                    credentials.service_account_key.display(),
                    e
                ))
            })?;

        let service_account: ServiceAccountKey = serde_json::from_str(&key_content)
            .map_err(|e| StoreError::Credentials(format!("Invalid service account key: {}", e)))?;

        Ok(Self {
            credentials,
            client: Client::new(),
            token_cache: RwLock::new(TokenCache::default()),
            service_account,
        })
    }

    /// Get or refresh the OAuth2 access token (5 minute refresh margin)
    async fn access_token(&self) -> Result<String> {
        {
            let cache = self.token_cache.read().await;
            if let (Some(token), Some(expires)) = (&cache.access_token, cache.expires_at) {
                if Utc::now() < expires - Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        let mut cache = self.token_cache.write().await;
        if let (Some(token), Some(expires)) = (&cache.access_token, cache.expires_at) {
            if Utc::now() < expires - Duration::minutes(5) {
                return Ok(token.clone());
            }
        }

        let now = Utc::now();
        let exp = now + Duration::hours(1);

        #[derive(Serialize)]
        struct Claims {
            iss: String,
            scope: String,
            aud: String,
            iat: i64,
            exp: i64,
        }

        let claims = Claims {
            iss: self.service_account.client_email.clone(),
            scope: OAUTH_SCOPE.to_string(),
            aud: TOKEN_URL.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.service_account.private_key.as_bytes())
            .map_err(|e| StoreError::Credentials(format!("Invalid private key: {}", e)))?;

        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &assertion),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "OAuth token exchange failed: {}",
                detail
            )));
        }

        let token: TokenResponse = response.json().await?;

        cache.access_token = Some(token.access_token.clone());
        cache.expires_at = Some(now + Duration::seconds(token.expires_in));

        Ok(token.access_token)
    }

    /// Make an authenticated API request
    async fn api_request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let token = self.access_token().await?;

        debug!("API request: {} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token));

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
}

#[async_trait::async_trait]
impl ReviewService for GooglePlayReviews {
    fn name(&self) -> &str {
        "Google Play"
    }

    fn vendor(&self) -> Vendor {
        Vendor::GooglePlay
    }

    #[instrument(skip(self, request), fields(app_id))]
    async fn fetch_reviews(&self, app_id: &str, request: &ReviewRequest) -> Result<ReviewPage> {
        let mut warnings = Vec::new();

        if request.country.is_some() {
            warnings.push(
                "Google Play does not support filtering reviews by country; filter ignored"
                    .to_string(),
            );
        }

        let mut url = format!(
            "{}/applications/{}/reviews?maxResults={}",
            API_BASE_URL,
            app_id,
            request.limit.clamp(1, MAX_PAGE_SIZE)
        );

        if let Some(cursor) = &request.cursor {
            url.push_str(&format!("&token={}", cursor));
        }

        let response: ReviewsListResponse = self
            .api_request(reqwest::Method::GET, &url, None)
            .await?;

        Ok(page_from_reviews_response(
            response,
            app_id,
            request.sort,
            warnings,
        ))
    }

    /// The Android Publisher API cannot enumerate apps, so the listing is
    /// seeded from the configured package names.
    #[instrument(skip(self))]
    async fn list_apps(&self) -> Result<AppListing> {
        if self.credentials.packages.is_empty() {
            warn!("no Google Play packages configured");
            return Ok(AppListing {
                apps: Vec::new(),
                warnings: vec![
                    "Google Play cannot enumerate apps; add package names to \
                     [google_play].packages in reviewdeck.toml"
                        .to_string(),
                ],
            });
        }

        let apps = self
            .credentials
            .packages
            .iter()
            .map(|package| {
                let mut record =
                    AppRecord::new(Vendor::GooglePlay, package.clone(), package.clone());
                record.bundle_id = Some(package.clone());
                record.platforms = vec!["ANDROID".to_string()];
                record
            })
            .collect();

        Ok(AppListing {
            apps,
            warnings: Vec::new(),
        })
    }

    #[instrument(skip(self, body), fields(review_id))]
    async fn respond_to_review(&self, review_id: &str, body: &str) -> Result<ReviewResponse> {
        let (package, native_review) = split_review_id(review_id)?;

        #[derive(Deserialize)]
        struct ReplyEnvelope {
            result: Option<ReplyResult>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ReplyResult {
            #[serde(default)]
            reply_text: Option<String>,
            #[serde(default)]
            last_edited: Option<EpochTimestamp>,
        }

        let url = format!(
            "{}/applications/{}/reviews/{}:reply",
            API_BASE_URL, package, native_review
        );

        let payload = serde_json::json!({ "replyText": body });

        let response: ReplyEnvelope = self
            .api_request(reqwest::Method::POST, &url, Some(payload))
            .await?;

        let result = response.result.ok_or_else(|| {
            StoreError::MalformedResponse("reply response carried no result".to_string())
        })?;

        Ok(ReviewResponse {
            // No standalone response resource upstream; the review id routes
            // any later call.
            id: review_id.to_string(),
            body: result.reply_text.unwrap_or_else(|| body.to_string()),
            modified_at: result.last_edited.as_ref().and_then(epoch_to_datetime),
        })
    }

    async fn delete_response(&self, _response_id: &str) -> Result<()> {
        Err(StoreError::NotSupported(
            "Google Play does not support deleting developer replies".to_string(),
        ))
    }
}

/// Split a composite `"{package}/{reviewId}"` native id
fn split_review_id(review_id: &str) -> Result<(&str, &str)> {
    match review_id.split_once('/') {
        Some((package, review)) if !package.is_empty() && !review.is_empty() => {
            Ok((package, review))
        }
        _ => Err(StoreError::Other(format!(
            "Google Play review ids have the form '<package>/<review>'; got '{}'",
            review_id
        ))),
    }
}

/// Convert a non-success response into a structured error
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
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        status: Option<String>,
    }

    let (vendor_code, detail) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error.status, body.error.message.unwrap_or_default()),
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

// -----------------------------------------------------------------------------
// Wire shapes
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewsListResponse {
    #[serde(default)]
    reviews: Vec<ReviewEntry>,
    #[serde(default)]
    token_pagination: Option<TokenPagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewEntry {
    review_id: String,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    comments: Vec<CommentEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentEntry {
    #[serde(default)]
    user_comment: Option<UserComment>,
    #[serde(default)]
    developer_comment: Option<DeveloperComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserComment {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    last_modified: Option<EpochTimestamp>,
    #[serde(default)]
    star_rating: Option<u8>,
    #[serde(default)]
    app_version_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeveloperComment {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    last_modified: Option<EpochTimestamp>,
}

/// google.protobuf int64 fields arrive as JSON strings; tolerate numbers too
#[derive(Debug, Deserialize)]
struct EpochTimestamp {
    #[serde(default)]
    seconds: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPagination {
    #[serde(default)]
    next_page_token: Option<String>,
}

fn epoch_to_datetime(timestamp: &EpochTimestamp) -> Option<DateTime<Utc>> {
    let value = timestamp.seconds.as_ref()?;
    let seconds = value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))?;
    DateTime::from_timestamp(seconds, 0)
}

/// Play review text sometimes carries a tab-separated title
fn split_title(text: &str) -> (Option<String>, String) {
    match text.split_once('\t') {
        Some((title, body)) if !title.trim().is_empty() => {
            (Some(title.trim().to_string()), body.trim().to_string())
        }
        _ => (None, text.trim().to_string()),
    }
}

/// Build the caller-facing page from the wire response.
///
/// The API returns reviews newest-first only; other orders are applied within
/// this page and noted as a warning.
fn page_from_reviews_response(
    response: ReviewsListResponse,
    package: &str,
    sort: SortOrder,
    mut warnings: Vec<String>,
) -> ReviewPage {
    let mut reviews: Vec<Review> = response
        .reviews
        .iter()
        .map(|entry| {
            let user = entry.comments.iter().find_map(|c| c.user_comment.as_ref());
            let developer = entry
                .comments
                .iter()
                .find_map(|c| c.developer_comment.as_ref());

            let composite_id = format!("{}/{}", package, entry.review_id);
            let (title, body) = user
                .and_then(|u| u.text.as_deref())
                .map(split_title)
                .unwrap_or((None, String::new()));

            Review {
                id: composite_id.clone(),
                rating: user.and_then(|u| u.star_rating).unwrap_or(0),
                title,
                body,
                reviewer: entry.author_name.clone().filter(|name| !name.is_empty()),
                territory: None,
                app_version: user.and_then(|u| u.app_version_name.clone()),
                created_at: user.and_then(|u| u.last_modified.as_ref()).and_then(epoch_to_datetime),
                response: developer.map(|comment| ReviewResponse {
                    id: composite_id.clone(),
                    body: comment.text.clone().unwrap_or_default(),
                    modified_at: comment.last_modified.as_ref().and_then(epoch_to_datetime),
                }),
            }
        })
        .collect();

    match sort {
        SortOrder::NewestFirst => {}
        SortOrder::OldestFirst => {
            reviews.reverse();
            warnings.push(page_order_warning("oldest-first"));
        }
        SortOrder::HighestRatingFirst => {
            reviews.sort_by(|a, b| b.rating.cmp(&a.rating));
            warnings.push(page_order_warning("highest-rating"));
        }
        SortOrder::LowestRatingFirst => {
            reviews.sort_by(|a, b| a.rating.cmp(&b.rating));
            warnings.push(page_order_warning("lowest-rating"));
        }
        SortOrder::MostHelpful => {
            warnings.push(
                "Google Play does not support most-helpful ordering; returning newest first"
                    .to_string(),
            );
        }
    }

    let next_cursor = response
        .token_pagination
        .and_then(|t| t.next_page_token)
        .filter(|token| !token.is_empty());

    ReviewPage {
        reviews,
        pagination: Pagination {
            total_count: None,
            has_more: next_cursor.is_some(),
            next_cursor,
            previous_cursor: None,
        },
        warnings,
    }
}

fn page_order_warning(order: &str) -> String {
    format!(
        "Google Play returns reviews newest-first; {} ordering applied within this page only",
        order
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_review_id() {
        let (package, review) = split_review_id("com.example.app/abc123").unwrap();
        assert_eq!(package, "com.example.app");
        assert_eq!(review, "abc123");

        assert!(split_review_id("noslash").is_err());
        assert!(split_review_id("/review").is_err());
        assert!(split_review_id("com.example.app/").is_err());
    }

    #[test]
    fn test_split_title() {
        assert_eq!(
            split_title("Nice\tWorks well"),
            (Some("Nice".to_string()), "Works well".to_string())
        );
        assert_eq!(split_title("Just a body"), (None, "Just a body".to_string()));
    }

    #[test]
    fn test_epoch_to_datetime_accepts_string_and_number() {
        let string_form: EpochTimestamp =
            serde_json::from_str(r#"{"seconds": "1709290800"}"#).unwrap();
        let number_form: EpochTimestamp =
            serde_json::from_str(r#"{"seconds": 1709290800}"#).unwrap();
        assert_eq!(
            epoch_to_datetime(&string_form),
            epoch_to_datetime(&number_form)
        );
        assert!(epoch_to_datetime(&string_form).is_some());

        let empty: EpochTimestamp = serde_json::from_str("{}").unwrap();
        assert!(epoch_to_datetime(&empty).is_none());
    }

    #[test]
    fn test_page_from_reviews_response() {
        let raw = r#"{
            "reviews": [
                {
                    "reviewId": "r-new",
                    "authorName": "alex",
                    "comments": [
                        {
                            "userComment": {
                                "text": "Love it\tFive stars from me",
                                "lastModified": { "seconds": "1709290800" },
                                "starRating": 5,
                                "appVersionName": "2.0.1"
                            }
                        },
                        {
                            "developerComment": {
                                "text": "Thanks!",
                                "lastModified": { "seconds": "1709377200" }
                            }
                        }
                    ]
                },
                {
                    "reviewId": "r-old",
                    "authorName": "",
                    "comments": [
                        {
                            "userComment": {
                                "text": "Meh",
                                "lastModified": { "seconds": "1709204400" },
                                "starRating": 2
                            }
                        }
                    ]
                }
            ],
            "tokenPagination": { "nextPageToken": "TOKEN" }
        }"#;

        let response: ReviewsListResponse = serde_json::from_str(raw).unwrap();
        let page = page_from_reviews_response(
            response,
            "com.example.app",
            SortOrder::NewestFirst,
            vec![],
        );

        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.reviews[0].id, "com.example.app/r-new");
        assert_eq!(page.reviews[0].title.as_deref(), Some("Love it"));
        assert_eq!(page.reviews[0].body, "Five stars from me");
        assert_eq!(page.reviews[0].rating, 5);
        assert_eq!(page.reviews[0].reviewer.as_deref(), Some("alex"));
        let response = page.reviews[0].response.as_ref().unwrap();
        assert_eq!(response.id, "com.example.app/r-new");
        assert_eq!(response.body, "Thanks!");

        // Empty author names are dropped
        assert!(page.reviews[1].reviewer.is_none());

        assert_eq!(page.pagination.next_cursor.as_deref(), Some("TOKEN"));
        assert!(page.pagination.has_more);
    }

    #[test]
    fn test_page_sorting_within_page() {
        let raw = r#"{
            "reviews": [
                { "reviewId": "a", "comments": [ { "userComment": { "text": "x", "starRating": 2 } } ] },
                { "reviewId": "b", "comments": [ { "userComment": { "text": "y", "starRating": 5 } } ] }
            ]
        }"#;

        let response: ReviewsListResponse = serde_json::from_str(raw).unwrap();
        let page = page_from_reviews_response(
            response,
            "com.example.app",
            SortOrder::HighestRatingFirst,
            vec![],
        );

        assert_eq!(page.reviews[0].rating, 5);
        assert_eq!(page.reviews[1].rating, 2);
        assert_eq!(page.warnings.len(), 1);
        assert!(page.warnings[0].contains("within this page"));
        assert!(!page.pagination.has_more);
    }
}
