//! Adapter contract between the picker and a paged, searchable data source.
//!
//! Modules:
//! - `contract`: The [`PickerAdapter`] trait and its advertised lookup capabilities
//! - `null`: No-op adapter for tests and disabled pickers

mod contract;
mod null;

pub use contract::{LookupCapabilities, PickerAdapter};
pub use null::NullAdapter;
