//! Dispatch error types

use thiserror::Error;

use reviewdeck_core::{MalformedId, Vendor};
use reviewdeck_directory::StorageError;
use reviewdeck_stores::StoreError;

/// Errors surfaced by the dispatch layer
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A vendor call failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or writing the app directory failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An id-scoped operation received an unusable id
    #[error(transparent)]
    MalformedId(#[from] MalformedId),

    /// No vendor has credentials at all
    #[error(
        "No store credentials configured; add an [app_store] or [google_play] \
         section to reviewdeck.toml"
    )]
    NoCredentials,

    /// The query resolved to a vendor that has no credentials
    #[error(
        "'{app}' belongs to {vendor}, which is not configured; add {vendor} \
         credentials to reviewdeck.toml"
    )]
    VendorNotConfigured { app: String, vendor: Vendor },

    /// The query matched nothing and no vendor could be inferred
    #[error(
        "Could not resolve '{0}' to a known app; run `reviewdeck apps sync` to \
         refresh the app directory, or add the app with `reviewdeck apps add`"
    )]
    UnresolvableQuery(String),
}

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;
