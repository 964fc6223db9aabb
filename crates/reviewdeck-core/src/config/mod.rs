//! Configuration types and loading
//!
//! Configuration is an explicit value handed to constructors; there is no
//! process-wide state. Credentials for either store may be absent - the
//! dispatch layer downgrades an uncredentialed vendor instead of failing.

mod loader;
mod types;

pub use loader::{find_config, load_config, load_config_or_default};
pub use types::{AppStoreCredentials, Config, GooglePlayCredentials};
