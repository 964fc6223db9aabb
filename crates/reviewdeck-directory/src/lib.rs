//! Persisted app directory for Reviewdeck
//!
//! A durable local cache of the apps known across all configured stores,
//! plus the local-only metadata overlay (hidden flag, notes, project URL)
//! that survives vendor re-sync. The directory is the resolution surface the
//! dispatch layer uses to turn a free-form app query into a vendor and a
//! wire identifier.
//!
//! The persisted document is a single pretty-printed JSON array, written
//! whole on every save via write-temp-then-rename so a crash never leaves a
//! truncated file. A missing file is an empty store, not an error.

pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{AppDirectory, ResolvedTarget};
