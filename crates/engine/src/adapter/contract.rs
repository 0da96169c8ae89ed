use async_trait::async_trait;
use picker_types::{ListRequest, ListResponse, PickerOption};

use crate::PickerError;

/// Optional point/bulk lookups an adapter implements.
///
/// The picker only calls `get_by_id` / `get_by_ids` when the matching flag is
/// set; the trait's default bodies exist so adapters without lookups compile
/// without boilerplate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupCapabilities {
    pub by_id: bool,
    pub by_ids: bool,
}

impl LookupCapabilities {
    pub const NONE: Self = Self { by_id: false, by_ids: false };
    pub const SINGLE: Self = Self { by_id: true, by_ids: false };
    pub const BULK: Self = Self { by_id: false, by_ids: true };
    pub const ALL: Self = Self { by_id: true, by_ids: true };

    pub fn any(&self) -> bool {
        self.by_id || self.by_ids
    }
}

/// Trait describing a paged, searchable data source backing a picker.
///
/// Implementations own transport concerns (HTTP, RPC, in-memory). The picker
/// may invoke them concurrently from several instances, hence `Send + Sync`.
/// `label_of` and `value_of` must be stable for a given item.
#[async_trait]
pub trait PickerAdapter: Send + Sync + 'static {
    /// Domain item returned by the data source.
    type Item: Send + Sync + 'static;

    /// Fetch one page of items for the request.
    async fn list(&self, request: ListRequest) -> anyhow::Result<ListResponse<Self::Item>>;

    /// Advertise which optional lookups are implemented.
    fn capabilities(&self) -> LookupCapabilities {
        LookupCapabilities::NONE
    }

    /// Look up a single item by identifier. `Ok(None)` means "not found".
    async fn get_by_id(&self, _id: &str) -> anyhow::Result<Option<Self::Item>> {
        Err(PickerError::unsupported("get_by_id").into())
    }

    /// Look up several items at once. Identifiers absent from the result are unresolved.
    async fn get_by_ids(&self, _ids: &[String]) -> anyhow::Result<Vec<Self::Item>> {
        Err(PickerError::unsupported("get_by_ids").into())
    }

    /// Display text for an item.
    fn label_of(&self, item: &Self::Item) -> String;

    /// Stable identifier for an item.
    fn value_of(&self, item: &Self::Item) -> String;

    /// Build the rendered option for an item.
    fn to_option(&self, item: &Self::Item) -> PickerOption {
        PickerOption::new(self.value_of(item), self.label_of(item))
    }
}
