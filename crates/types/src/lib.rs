//! Shared type definitions for the picker workspace.
//!
//! These types sit at the boundary between the orchestration engine and the
//! caller-supplied adapter: the option shape rendered by a picker, the paged
//! list request/response contract, the normalized selection, and the
//! caller-facing configuration surface.

mod config;
mod option;
mod request;

pub use config::{ConfigError, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_MS, PickerConfig, SelectionMode};
pub use option::{PickerOption, SelectionSet};
pub use request::{ListRequest, ListResponse, PageSignal};
