//! Picker settings persistence.
//!
//! Settings are a [`PickerConfig`] document stored as JSON or YAML. The
//! default location is `<config dir>/picker/settings.json`; the
//! `PICKER_SETTINGS_PATH` environment variable overrides it. A missing
//! default file yields the built-in defaults, and an unreadable default file
//! is logged and ignored so a broken settings file never blocks start-up.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs_next::{config_dir, home_dir};
use picker_types::{ConfigError, PickerConfig};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "PICKER_SETTINGS_PATH";

/// Default filename for the settings document.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Error surfaced when reading settings or fixture documents fails.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse {path} as YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Resolve the settings path, honoring [`SETTINGS_PATH_ENV`].
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV)
        && !path.trim().is_empty()
    {
        return resolve_user_path(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("picker")
        .join(SETTINGS_FILE_NAME)
}

/// Load settings from the default location.
///
/// Missing or unparsable files fall back to [`PickerConfig::default`];
/// only I/O failures other than "not found" are reported.
pub fn load_settings() -> Result<PickerConfig, SettingsError> {
    let path = default_settings_path();
    match load_settings_from_path(&path) {
        Ok(config) => Ok(config),
        Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file; using defaults");
            Ok(PickerConfig::default())
        }
        Err(error @ SettingsError::Io { .. }) => Err(error),
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "Failed to load settings file; using defaults"
            );
            Ok(PickerConfig::default())
        }
    }
}

/// Load and validate settings from an explicit path.
pub fn load_settings_from_path(path: impl AsRef<Path>) -> Result<PickerConfig, SettingsError> {
    let path = path.as_ref();
    let config: PickerConfig = read_document(path)?;
    config.validate().map_err(|source| SettingsError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}

/// Read a JSON or YAML document into `T`.
///
/// Files with a `.json` extension are parsed strictly as JSON; anything else
/// goes through the YAML parser, which also accepts JSON input.
pub fn read_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SettingsError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(&content).map_err(|source| SettingsError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn resolve_user_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    match trimmed {
        "~" => home(),
        _ => match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
            Some(rest) => home().join(rest),
            None => PathBuf::from(trimmed),
        },
    }
}
