//! Render-safe view of the controlled value.
//!
//! A selected identifier is only exposed once the store holds a label for it,
//! so the rendering layer never shows a bare identifier.

use picker_types::{SelectionMode, SelectionSet};
use serde::Serialize;

use crate::ResultStore;

/// Value handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExposedValue {
    Single(Option<String>),
    Multi(Vec<String>),
}

impl ExposedValue {
    pub fn empty(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => ExposedValue::Single(None),
            SelectionMode::Multi => ExposedValue::Multi(Vec::new()),
        }
    }
}

/// Derive the exposed value for `selection`.
///
/// Multi-select exposes the labelled subset in selection order. Single-select
/// exposes the value only once it is labelled.
pub fn exposed_value(selection: &SelectionSet, mode: SelectionMode, store: &ResultStore) -> ExposedValue {
    match mode {
        SelectionMode::Single => ExposedValue::Single(
            selection
                .first()
                .filter(|value| store.label_of(value).is_some())
                .map(str::to_string),
        ),
        SelectionMode::Multi => ExposedValue::Multi(
            selection
                .iter()
                .filter(|value| store.label_of(value).is_some())
                .map(str::to_string)
                .collect(),
        ),
    }
}
