//! Common types shared across Reviewdeck crates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// App store vendor identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    /// Apple App Store (App Store Connect API)
    AppStore,
    /// Google Play (Android Publisher API)
    GooglePlay,
}

impl Vendor {
    /// The scheme prefix used in scoped review/response ids
    pub fn scheme(self) -> &'static str {
        match self {
            Vendor::AppStore => "as",
            Vendor::GooglePlay => "gp",
        }
    }

    /// Parse a scoped-id scheme prefix ("as" or "gp")
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "as" => Some(Vendor::AppStore),
            "gp" => Some(Vendor::GooglePlay),
            _ => None,
        }
    }

    /// Resolve a user-supplied store name, case-insensitively.
    ///
    /// Accepts "appstore", "app store" and "apple" for the App Store, and
    /// "googleplay", "google play" and "android" for Google Play.
    pub fn from_alias(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "appstore" | "app store" | "apple" => Some(Vendor::AppStore),
            "googleplay" | "google play" | "android" => Some(Vendor::GooglePlay),
            _ => None,
        }
    }

    /// All vendors, in dispatch preference order (App Store first)
    pub fn all() -> [Vendor; 2] {
        [Vendor::AppStore, Vendor::GooglePlay]
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vendor::AppStore => write!(f, "App Store"),
            Vendor::GooglePlay => write!(f, "Google Play"),
        }
    }
}

/// One entry in the locally persisted app directory.
///
/// Vendor-provided fields are overwritten on every listing re-sync; the
/// local-only fields (`project_url`, `is_hidden`, `notes`) are preserved by a
/// field-level merge. Records are keyed by (vendor, bundle/package id falling
/// back to native id), case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    /// Vendor-native app id (numeric id for the App Store, package name for
    /// Google Play)
    pub native_id: String,

    /// Display name
    pub name: String,

    /// Bundle id (App Store) or package name (Google Play)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    /// Store SKU, when the vendor exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Target platforms, in vendor order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<String>,

    /// Owning vendor
    pub vendor: Vendor,

    /// Primary locale (e.g. "en-US")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_locale: Option<String>,

    /// Whether the app is currently available on the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,

    /// Latest known store version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,

    /// Project/homepage URL. Local-only, never touched by re-sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,

    /// Hidden from default listings. Local-only, never touched by re-sync.
    #[serde(default)]
    pub is_hidden: bool,

    /// Free-form notes. Local-only, never touched by re-sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AppRecord {
    /// Minimal record with only the vendor-required fields set
    pub fn new(vendor: Vendor, native_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            native_id: native_id.into(),
            name: name.into(),
            bundle_id: None,
            sku: None,
            platforms: Vec::new(),
            vendor,
            primary_locale: None,
            is_available: None,
            current_version: None,
            project_url: None,
            is_hidden: false,
            notes: None,
        }
    }

    /// The identifier this record is keyed by: bundle/package id when known,
    /// native id otherwise.
    pub fn key_id(&self) -> &str {
        self.bundle_id.as_deref().unwrap_or(&self.native_id)
    }
}

/// Requested ordering for a review page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recent first
    #[default]
    NewestFirst,
    /// Oldest first
    OldestFirst,
    /// Highest star rating first
    HighestRatingFirst,
    /// Lowest star rating first
    LowestRatingFirst,
    /// Most helpful first (vendor support varies)
    MostHelpful,
}

/// Caller-facing request for a page of reviews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Requested ordering
    #[serde(default)]
    pub sort: SortOrder,

    /// ISO 3166-1 alpha-2 country filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Opaque pagination cursor from a previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    /// Maximum reviews per page
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

impl Default for ReviewRequest {
    fn default() -> Self {
        Self {
            sort: SortOrder::default(),
            country: None,
            cursor: None,
            limit: default_limit(),
        }
    }
}

/// A developer response attached to a review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    /// Response id (scoped once it leaves the dispatcher)
    pub id: String,

    /// Response text
    pub body: String,

    /// Last modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// A single customer review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review id (scoped once it leaves the dispatcher)
    pub id: String,

    /// Star rating, 1-5
    pub rating: u8,

    /// Review title, when the vendor has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Review text
    pub body: String,

    /// Reviewer nickname
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,

    /// Store territory the review was left in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub territory: Option<String>,

    /// App version the review refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Existing developer response, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ReviewResponse>,
}

/// Pagination state accompanying a review page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total review count, when the vendor reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,

    /// Cursor for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,

    /// Cursor for the previous page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<String>,

    /// Whether more pages exist
    pub has_more: bool,
}

/// One page of reviews plus pagination state and non-fatal warnings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPage {
    /// Reviews in requested order
    pub reviews: Vec<Review>,

    /// Pagination state
    pub pagination: Pagination,

    /// Non-fatal warnings (unsupported sort, filter degradation, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Result of listing apps from one or more vendors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppListing {
    /// App records
    pub apps: Vec<AppRecord>,

    /// Non-fatal warnings accumulated while listing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
