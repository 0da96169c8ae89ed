use async_trait::async_trait;
use picker_types::{ListRequest, ListResponse, PickerOption};

use super::PickerAdapter;

/// Adapter that never returns any items.
///
/// Every page is empty with `hasMore = false`, so a picker backed by it
/// settles immediately. Selected values stay unresolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAdapter;

#[async_trait]
impl PickerAdapter for NullAdapter {
    type Item = PickerOption;

    async fn list(&self, _request: ListRequest) -> anyhow::Result<ListResponse<PickerOption>> {
        Ok(ListResponse::with_has_more(Vec::new(), false))
    }

    fn label_of(&self, item: &PickerOption) -> String {
        item.label.clone()
    }

    fn value_of(&self, item: &PickerOption) -> String {
        item.value.clone()
    }
}
