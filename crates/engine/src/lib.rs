//! # Picker Engine
//!
//! The Picker Engine drives a searchable, paginated picker backed by a remote
//! data source. It loads pages on demand, merges them without duplicates,
//! debounces search input, and keeps human-readable labels available for
//! selected values that are not part of the loaded pages.
//!
//! ## Key Features
//!
//! - **Single-flight Pagination**: At most one page request is outstanding per picker
//! - **Session Resets**: Search, filter parameters and a dependency token define the data universe
//! - **Selection Labels**: Missing labels are resolved through optional point or bulk lookups
//! - **Render Guard**: Selected values are only exposed once a label is known
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use picker_engine::{NullAdapter, spawn_picker};
//! use picker_types::{PickerConfig, SelectionSet};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), picker_engine::PickerError> {
//! let picker = spawn_picker(Arc::new(NullAdapter), PickerConfig::default(), SelectionSet::empty())?;
//! let snapshot = picker.idle().await?;
//! assert!(snapshot.options.is_empty());
//! assert!(!snapshot.has_more);
//! picker.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`adapter`**: The data source contract implemented by callers
//! - **`debounce`**: Trailing-edge debouncing of search input
//! - **`session`**: Session identity and generation counting
//! - **`pagination`**: Page cursor state machine
//! - **`store`**: Ordered, deduplicated option store
//! - **`selection`**: Lookup planning and execution for missing labels
//! - **`presentation`**: Render-safe exposed value
//! - **`controller`**: Actor task tying the pieces together, and its handle

pub mod adapter;
pub mod controller;
pub mod debounce;
mod error;
pub mod pagination;
pub mod presentation;
pub mod selection;
pub mod session;
pub mod store;

// Re-export commonly used types for convenience
pub use adapter::{LookupCapabilities, NullAdapter, PickerAdapter};
pub use controller::{PickerHandle, PickerSnapshot, spawn_picker};
pub use debounce::{SearchDebouncer, SettledSearch};
pub use error::PickerError;
pub use pagination::{FetchStamp, PaginationState, derive_has_more};
pub use presentation::{ExposedValue, exposed_value};
pub use selection::{LookupDecision, LookupOutcome, LookupPlan, LookupTicket, SelectionResolver, execute_lookup, missing_values};
pub use session::{Generation, SessionKey, SessionTracker};
pub use store::ResultStore;
