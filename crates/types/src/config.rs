use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use thiserror::Error;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default quiet window before a search term is considered settled.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default deadline applied to every adapter call.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Whether the picker exposes one value or a list of values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// Error surfaced when a picker configuration is rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pageSize must be a positive integer")]
    ZeroPageSize,
    #[error("debounceMs must be a positive number of milliseconds")]
    ZeroDebounceWindow,
    #[error("requestTimeoutMs must be positive when set")]
    ZeroRequestTimeout,
}

/// Caller-facing configuration for a picker instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PickerConfig {
    /// Items requested per page.
    pub page_size: u32,
    /// Opaque filter object forwarded into every `list` call.
    pub params: Option<JsonMap<String, Value>>,
    /// Opaque token; any change forces a session reset.
    pub dependency_token: Option<String>,
    /// Enables diagnostic logging of contained adapter failures.
    pub debug: bool,
    /// Quiet window for search debouncing.
    pub debounce_ms: u64,
    /// Deadline for each adapter call; `None` waits indefinitely.
    pub request_timeout_ms: Option<u64>,
    pub selection_mode: SelectionMode,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            params: None,
            dependency_token: None,
            debug: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
            selection_mode: SelectionMode::Single,
        }
    }
}

impl PickerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounceWindow);
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
