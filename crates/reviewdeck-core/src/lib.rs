//! Core library for Reviewdeck
//!
//! Shared types, configuration and error definitions used by the vendor
//! clients, the app directory and the dispatch layer.
//!
//! ## Key types
//!
//! - [`Vendor`]: which app store backs an app ([`Vendor::AppStore`] or
//!   [`Vendor::GooglePlay`]).
//! - [`ScopedId`]: a vendor-prefixed review/response id (`"as:123"`,
//!   `"gp:com.example.app/abc"`) so callers never track vendor origin.
//! - [`AppRecord`]: one entry in the locally persisted app directory,
//!   including local-only metadata that survives vendor re-sync.
//! - [`ReviewRequest`] / [`ReviewPage`]: the caller-facing request and
//!   response shapes for fetching reviews.
//! - [`Config`]: per-vendor credentials plus the directory location, loaded
//!   from `reviewdeck.toml` and passed explicitly into constructors.

pub mod config;
pub mod error;
pub mod id;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use id::{MalformedId, ScopedId};
pub use types::*;
