//! Error types for picker orchestration.
//!
//! Adapter failures are contained inside the picker: they are converted into
//! [`PickerError`] values, logged, and folded into state (`has_more = false`
//! or "unresolved"). Only handle operations against a stopped picker return
//! an error to the caller.

use picker_types::ConfigError;
use picker_util::DeadlineError;
use thiserror::Error;

/// Main error type for picker operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("list fetch for page {page} failed: {message}")]
    Fetch { page: u32, message: String },

    #[error("lookup for '{id}' failed: {message}")]
    Lookup { id: String, message: String },

    #[error("bulk lookup of {count} values failed: {message}")]
    BulkLookup { count: usize, message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("adapter does not support {capability}")]
    Unsupported { capability: String },

    #[error("invalid picker configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("picker has shut down")]
    Closed,
}

impl PickerError {
    /// Create a list fetch failure.
    pub fn fetch(page: u32, error: impl std::fmt::Display) -> Self {
        Self::Fetch {
            page,
            message: error.to_string(),
        }
    }

    /// Create a single lookup failure.
    pub fn lookup(id: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Lookup {
            id: id.into(),
            message: error.to_string(),
        }
    }

    /// Create a bulk lookup failure.
    pub fn bulk_lookup(count: usize, error: impl std::fmt::Display) -> Self {
        Self::BulkLookup {
            count,
            message: error.to_string(),
        }
    }

    /// Create an unsupported capability error.
    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }
}

impl From<DeadlineError> for PickerError {
    fn from(error: DeadlineError) -> Self {
        Self::Timeout {
            operation: error.operation,
            timeout_ms: error.timeout_ms,
        }
    }
}
