//! In-memory adapter over a fixture dataset.

use async_trait::async_trait;
use picker_engine::{LookupCapabilities, PickerAdapter};
use picker_types::{ListRequest, ListResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

/// One fixture row. Fields other than `id` and `name` are matched against
/// the picker's filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub attributes: JsonMap<String, Value>,
}

impl FixtureRecord {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::String(self.id.clone())),
            "name" => Some(Value::String(self.name.clone())),
            other => self.attributes.get(other).cloned(),
        }
    }

    fn matches(&self, needle: &str, params: Option<&JsonMap<String, Value>>) -> bool {
        if !self.name.to_lowercase().contains(needle) {
            return false;
        }
        params.is_none_or(|params| params.iter().all(|(key, expected)| self.field(key).as_ref() == Some(expected)))
    }
}

/// How the fixture adapter reports whether more pages exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixtureSignal {
    #[default]
    Total,
    HasMore,
}

#[derive(Debug, Clone)]
pub struct FixtureAdapter {
    records: Vec<FixtureRecord>,
    signal: FixtureSignal,
    capabilities: LookupCapabilities,
}

impl FixtureAdapter {
    pub fn new(records: Vec<FixtureRecord>, signal: FixtureSignal, capabilities: LookupCapabilities) -> Self {
        Self {
            records,
            signal,
            capabilities,
        }
    }
}

#[async_trait]
impl PickerAdapter for FixtureAdapter {
    type Item = FixtureRecord;

    async fn list(&self, request: ListRequest) -> anyhow::Result<ListResponse<FixtureRecord>> {
        let needle = request.search.as_deref().unwrap_or_default().to_lowercase();
        let matching: Vec<&FixtureRecord> = self
            .records
            .iter()
            .filter(|record| record.matches(&needle, request.params.as_ref()))
            .collect();
        let total = matching.len();
        let items: Vec<FixtureRecord> = matching
            .into_iter()
            .skip(request.offset())
            .take(request.page_size as usize)
            .cloned()
            .collect();

        Ok(match self.signal {
            FixtureSignal::Total => ListResponse::with_total(items, total as u64),
            FixtureSignal::HasMore => {
                let has_more = request.offset() + items.len() < total;
                ListResponse::with_has_more(items, has_more)
            }
        })
    }

    fn capabilities(&self) -> LookupCapabilities {
        self.capabilities
    }

    async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<FixtureRecord>> {
        Ok(self.records.iter().find(|record| record.id == id).cloned())
    }

    async fn get_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<FixtureRecord>> {
        Ok(self.records.iter().filter(|record| ids.contains(&record.id)).cloned().collect())
    }

    fn label_of(&self, item: &FixtureRecord) -> String {
        item.name.clone()
    }

    fn value_of(&self, item: &FixtureRecord) -> String {
        item.id.clone()
    }
}
