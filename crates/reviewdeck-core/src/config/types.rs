//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Reviewdeck configuration (`reviewdeck.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the persisted app directory document.
    /// Defaults to `~/.reviewdeck/apps.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// App Store Connect credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_store: Option<AppStoreCredentials>,

    /// Google Play credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_play: Option<GooglePlayCredentials>,
}

impl Config {
    /// Resolved app directory path: the configured one, or
    /// `~/.reviewdeck/apps.json`, or `./reviewdeck-apps.json` when no home
    /// directory can be determined.
    pub fn directory_path(&self) -> PathBuf {
        if let Some(path) = &self.directory {
            return path.clone();
        }
        dirs::home_dir()
            .map(|home| home.join(".reviewdeck").join("apps.json"))
            .unwrap_or_else(|| PathBuf::from("reviewdeck-apps.json"))
    }
}

/// App Store Connect API credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStoreCredentials {
    /// API key id
    pub key_id: String,

    /// API key issuer id
    pub issuer_id: String,

    /// Path to the .p8 key file, or the key contents inline
    pub key: String,
}

impl AppStoreCredentials {
    /// Build credentials from the standard App Store Connect environment
    /// variables, when all of them are set.
    pub fn from_env() -> Option<Self> {
        let key_id = std::env::var("APP_STORE_CONNECT_API_KEY_ID").ok()?;
        let issuer_id = std::env::var("APP_STORE_CONNECT_ISSUER_ID").ok()?;
        let key = std::env::var("APP_STORE_CONNECT_API_KEY")
            .or_else(|_| std::env::var("APP_STORE_CONNECT_API_KEY_PATH"))
            .ok()?;
        Some(Self {
            key_id,
            issuer_id,
            key,
        })
    }
}

/// Google Play service-account credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GooglePlayCredentials {
    /// Path to the service account JSON key file
    pub service_account_key: PathBuf,

    /// Package names of the apps this account manages. The Android Publisher
    /// API cannot enumerate apps, so the listing flow is seeded from here.
    #[serde(default)]
    pub packages: Vec<String>,
}
