//! Picker controller: one actor task per picker instance.

mod handle;
mod runner;
mod state;

pub use handle::{PickerHandle, spawn_picker};
use picker_types::PickerOption;
use serde::Serialize;

use crate::ExposedValue;

/// Render-ready view of a picker, published after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerSnapshot {
    /// Options to display, in display order.
    pub options: Vec<PickerOption>,
    /// Selection restricted to labelled values.
    pub value: ExposedValue,
    /// A page fetch or label lookup is outstanding.
    pub busy: bool,
    /// Typed search input has not been applied yet.
    pub settling: bool,
    pub page: u32,
    pub has_more: bool,
    /// Search term of the current session.
    pub search: String,
    pub generation: u64,
}
