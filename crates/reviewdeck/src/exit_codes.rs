//! Exit codes for the CLI

use reviewdeck_core::ConfigError;
use reviewdeck_dispatch::DispatchError;
use reviewdeck_stores::StoreError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration or credentials problem
pub const CONFIG_ERROR: i32 = 2;

/// The query could not be resolved to an app
pub const UNRESOLVABLE: i32 = 3;

/// A malformed review/response id was supplied
pub const BAD_ID: i32 = 4;

/// The vendor rejected the call
pub const API_ERROR: i32 = 5;

/// Map an error chain to an exit code
pub fn for_error(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }

    if let Some(dispatch) = error.downcast_ref::<DispatchError>() {
        return match dispatch {
            DispatchError::NoCredentials | DispatchError::VendorNotConfigured { .. } => {
                CONFIG_ERROR
            }
            DispatchError::UnresolvableQuery(_) => UNRESOLVABLE,
            DispatchError::MalformedId(_) => BAD_ID,
            DispatchError::Store(store) => store_code(store),
            DispatchError::Storage(_) => ERROR,
        };
    }

    ERROR
}

fn store_code(error: &StoreError) -> i32 {
    match error {
        StoreError::Credentials(_) | StoreError::Auth(_) => CONFIG_ERROR,
        StoreError::Api { .. } | StoreError::RateLimited { .. } => API_ERROR,
        _ => ERROR,
    }
}
