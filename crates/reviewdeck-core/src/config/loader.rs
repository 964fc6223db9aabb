//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{ConfigError, Result};

use super::types::{AppStoreCredentials, Config};

const CONFIG_FILE_NAME: &str = "reviewdeck.toml";

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    info!(path = %path.display(), "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: Config = toml::from_str(&content).map_err(ConfigError::TomlError)?;

    // App Store credentials fall back to the standard environment variables
    // when the section is absent from the file.
    if config.app_store.is_none() {
        if let Some(creds) = AppStoreCredentials::from_env() {
            debug!("using App Store Connect credentials from environment");
            config.app_store = Some(creds);
        }
    }

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find a configuration file.
///
/// At each directory level, starting at `start_dir` and walking parents up to
/// the filesystem root, checks for `reviewdeck.toml`. Falls back to
/// `~/.reviewdeck/config.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            info!(path = %config_path.display(), "found config file");
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".reviewdeck").join("config.toml");
    if home_config.exists() {
        info!(path = %home_config.display(), "found home config file");
        return Some(home_config);
    }

    debug!("no config file found");
    None
}

/// Load configuration searching from `dir`, or use defaults.
///
/// With no config file on disk the App Store section may still be populated
/// from the environment.
pub fn load_config_or_default(dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            warn!(dir = %dir.display(), "no config file found, using defaults");
            let mut config = Config::default();
            config.app_store = AppStoreCredentials::from_env();
            validate_config(&config)?;
            Ok((config, None))
        }
    }
}

/// Reject present-but-empty credential fields with a field-naming error
fn validate_config(config: &Config) -> Result<()> {
    if let Some(app_store) = &config.app_store {
        for (field, value) in [
            ("app_store.key_id", &app_store.key_id),
            ("app_store.issuer_id", &app_store.issuer_id),
            ("app_store.key", &app_store.key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
    }

    if let Some(google_play) = &config.google_play {
        if google_play.service_account_key.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "google_play.service_account_key".to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
