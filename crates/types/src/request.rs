use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

/// A single page request forwarded to the adapter's `list` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    /// One-based page number.
    pub page: u32,
    /// Number of items per page; always positive.
    pub page_size: u32,
    /// Settled search term, omitted when the search box is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Opaque filter parameters forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonMap<String, Value>>,
}

impl ListRequest {
    /// Zero-based offset of the first item on the requested page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

/// Pagination signal carried by a page response.
///
/// Backends report either a total item count or an explicit "more pages"
/// flag. Responses that carry neither (or carry an unusable value) decode to
/// [`PageSignal::Missing`], which stops paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    ByTotal { total: u64 },
    ByHasMore { has_more: bool },
    Missing,
}

impl PageSignal {
    /// Decode the signal from raw `total` / `hasMore` wire fields.
    ///
    /// A boolean `hasMore` takes precedence; otherwise a non-negative integer
    /// `total` is used.
    pub fn from_wire(total: Option<&Value>, has_more: Option<&Value>) -> Self {
        if let Some(Value::Bool(has_more)) = has_more {
            return PageSignal::ByHasMore { has_more: *has_more };
        }
        match total.and_then(Value::as_u64) {
            Some(total) => PageSignal::ByTotal { total },
            None => PageSignal::Missing,
        }
    }
}

/// One page of adapter items together with its pagination signal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireListResponse<T>", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub signal: PageSignal,
}

impl<T> ListResponse<T> {
    pub fn with_total(items: Vec<T>, total: u64) -> Self {
        Self {
            items,
            signal: PageSignal::ByTotal { total },
        }
    }

    pub fn with_has_more(items: Vec<T>, has_more: bool) -> Self {
        Self {
            items,
            signal: PageSignal::ByHasMore { has_more },
        }
    }

    pub fn without_signal(items: Vec<T>) -> Self {
        Self {
            items,
            signal: PageSignal::Missing,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    total: Option<Value>,
    #[serde(default)]
    has_more: Option<Value>,
}

impl<T> From<WireListResponse<T>> for ListResponse<T> {
    fn from(wire: WireListResponse<T>) -> Self {
        let signal = PageSignal::from_wire(wire.total.as_ref(), wire.has_more.as_ref());
        Self { items: wire.items, signal }
    }
}
