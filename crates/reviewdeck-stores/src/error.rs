//! Store error types

use thiserror::Error;

/// Store-related errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials missing or unusable at construction time
    #[error("Credentials not configured: {0}")]
    Credentials(String),

    /// Authentication failed talking to the vendor
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Structured API error from the vendor
    #[error("API error: {status} ({code}) - {detail}", code = .vendor_code.as_deref().unwrap_or("-"))]
    Api {
        status: u16,
        vendor_code: Option<String>,
        detail: String,
    },

    /// Rate limited by the vendor
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    /// The vendor cannot perform this operation at all
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The vendor returned a response we could not make sense of
    #[error("Malformed vendor response: {0}")]
    MalformedResponse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
