use serde::{Deserialize, Serialize};

/// A resolved picker entry: a stable identifier plus its display text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PickerOption {
    /// Unique, stable identifier of the domain item.
    pub value: String,
    /// Human-readable label shown in place of the identifier.
    pub label: String,
}

impl PickerOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Normalized list of externally selected values.
///
/// Single-select pickers carry zero or one value; multi-select pickers carry
/// any number. Values keep the caller's order and duplicates collapse onto
/// their first occurrence. Empty strings are treated as "no selection".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectionSet {
    values: Vec<String>,
}

impl SelectionSet {
    /// An empty selection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize a single-select value.
    pub fn single(value: Option<impl Into<String>>) -> Self {
        Self::from_values(value.into_iter().map(Into::into))
    }

    /// Normalize a list of values, dropping blanks and repeated entries.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if value.is_empty() || normalized.contains(&value) {
                continue;
            }
            normalized.push(value);
        }
        Self { values: normalized }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<String>> for SelectionSet {
    fn from(values: Vec<String>) -> Self {
        Self::from_values(values)
    }
}

impl From<Option<String>> for SelectionSet {
    fn from(value: Option<String>) -> Self {
        Self::single(value)
    }
}

impl From<SelectionSet> for Vec<String> {
    fn from(selection: SelectionSet) -> Self {
        selection.values
    }
}
