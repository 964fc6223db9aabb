//! Dispatch and aggregation core for Reviewdeck
//!
//! The single entry point hiding vendor topology from callers. Given a
//! free-form app query or a scoped review/response id, the
//! [`ReviewDispatcher`] resolves the owning vendor via the app directory,
//! routes the call to the right review service, and rewrites every id it
//! returns with the vendor's scheme prefix so a later respond/delete call can
//! be routed from the id alone.
//!
//! A vendor without credentials is held as
//! [`VendorSlot::NotConfigured`] and excluded from dispatch; construction
//! only fails when no vendor at all is configured. Listing fans out to every
//! configured vendor concurrently and folds per-vendor failures into
//! warnings instead of aborting.

pub mod dispatcher;
pub mod error;

pub use dispatcher::{ReviewDispatcher, VendorSlot};
pub use error::{DispatchError, Result};
