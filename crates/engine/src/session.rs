//! Session identity for a picker.
//!
//! A session is the data universe defined by the dependency token, the
//! filter parameters, and the settled search term. Whenever the derived
//! [`SessionKey`] changes, the picker starts a new [`Generation`]; work
//! issued under an older generation is discarded when it completes.

use std::{collections::BTreeMap, fmt};

use serde_json::{Map as JsonMap, Value};

/// Monotonic session counter stamped onto every page fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Opaque identity of a picker's data universe.
///
/// Parameters are serialized canonically (object keys sorted at every depth)
/// so that logically equal parameter objects produce equal keys. An absent
/// parameter object and an empty one are equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    dependency_token: Option<String>,
    params: String,
    search: String,
}

impl SessionKey {
    pub fn new(dependency_token: Option<&str>, params: Option<&JsonMap<String, Value>>, search: &str) -> Self {
        let params = params.map(|params| canonical_json(&Value::Object(params.clone()))).unwrap_or_else(|| "{}".to_string());
        Self {
            dependency_token: dependency_token.map(str::to_string),
            params,
            search: search.to_string(),
        }
    }
}

/// Tracks the current session key and its generation.
#[derive(Debug, Default)]
pub struct SessionTracker {
    current: Option<SessionKey>,
    generation: Generation,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`, returning the new generation when it differs from the
    /// previously observed key. The first observation always counts as a change.
    pub fn observe(&mut self, key: SessionKey) -> Option<Generation> {
        if self.current.as_ref() == Some(&key) {
            return None;
        }
        self.current = Some(key);
        self.generation = self.generation.next();
        Some(self.generation)
    }

    /// Start a new generation without changing the key.
    pub fn force_reset(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }
}

fn canonical_json(value: &Value) -> String {
    serde_json::to_string(&sorted(value)).unwrap_or_default()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<&String, Value> = map.iter().map(|(key, value)| (key, sorted(value))).collect();
            Value::Object(ordered.into_iter().map(|(key, value)| (key.clone(), value)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
