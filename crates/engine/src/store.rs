//! Ordered, deduplicated store of resolved picker options.

use indexmap::IndexMap;
use picker_types::{PickerOption, SelectionSet};

/// Options keyed by value in display order.
///
/// Values are unique; when the same value arrives twice the first occurrence
/// wins and keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultStore {
    entries: IndexMap<String, String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the store from a session's first page.
    ///
    /// Entries for currently selected values are kept ahead of the fresh page;
    /// everything else from the previous session is dropped.
    pub fn replace_with_first_page(&mut self, fresh: Vec<PickerOption>, selection: &SelectionSet) {
        let mut rebuilt: IndexMap<String, String> = self
            .entries
            .drain(..)
            .filter(|(value, _)| selection.contains(value))
            .collect();
        for option in fresh {
            rebuilt.entry(option.value).or_insert(option.label);
        }
        self.entries = rebuilt;
    }

    /// Append a later page of the same session.
    pub fn append_page(&mut self, fresh: Vec<PickerOption>) {
        for option in fresh {
            self.entries.entry(option.value).or_insert(option.label);
        }
    }

    /// Insert resolved options at the front, keeping their relative order and
    /// skipping values already present. Returns the number inserted.
    pub fn inject_front(&mut self, resolved: Vec<PickerOption>) -> usize {
        let mut front: IndexMap<String, String> = IndexMap::with_capacity(resolved.len() + self.entries.len());
        for option in resolved {
            if !self.entries.contains_key(&option.value) {
                front.entry(option.value).or_insert(option.label);
            }
        }
        let inserted = front.len();
        if inserted == 0 {
            return 0;
        }
        front.extend(self.entries.drain(..));
        self.entries = front;
        inserted
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains_key(value)
    }

    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.entries.get(value).map(String::as_str)
    }

    pub fn options(&self) -> Vec<PickerOption> {
        self.entries
            .iter()
            .map(|(value, label)| PickerOption::new(value.clone(), label.clone()))
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
