//! Label resolution for selected values missing from the result store.
//!
//! Selected identifiers are controlled from outside the picker and need not
//! appear in any loaded page. The resolver works out which of them lack a
//! label, picks a lookup strategy from the adapter's capabilities, and
//! guards the outcome with a [`LookupTicket`] so that a result computed for
//! an outdated selection is never applied.

use std::{collections::HashSet, time::Duration};

use futures_util::future::join_all;
use picker_types::{PickerOption, SelectionSet};
use picker_util::with_deadline;
use tracing::debug;

use crate::{LookupCapabilities, PickerAdapter, PickerError, ResultStore};

/// Selected values that have no entry in the store, in selection order.
pub fn missing_values(selection: &SelectionSet, store: &ResultStore) -> Vec<String> {
    selection
        .iter()
        .filter(|value| !store.contains(value))
        .map(str::to_string)
        .collect()
}

/// Strategy chosen for a set of missing values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupPlan {
    /// Nothing is missing.
    Idle,
    /// One `get_by_ids` call covering every value.
    Bulk(Vec<String>),
    /// One `get_by_id` call per value, run concurrently.
    PerItem(Vec<String>),
    /// The adapter offers no lookups; the values stay unresolved.
    Unsupported(Vec<String>),
}

impl LookupPlan {
    /// Choose a strategy.
    ///
    /// Bulk lookup is preferred for more than one value. A single value uses
    /// `get_by_id` when available and falls back to a one-element bulk call.
    pub fn for_missing(missing: Vec<String>, capabilities: LookupCapabilities) -> Self {
        match missing.len() {
            0 => LookupPlan::Idle,
            _ if !capabilities.any() => LookupPlan::Unsupported(missing),
            count if capabilities.by_ids && count > 1 => LookupPlan::Bulk(missing),
            _ if capabilities.by_id => LookupPlan::PerItem(missing),
            _ => LookupPlan::Bulk(missing),
        }
    }
}

/// Identity of an issued lookup, compared on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    serial: u64,
    missing: Vec<String>,
}

impl LookupTicket {
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

/// Result of executing a [`LookupPlan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupOutcome {
    /// Options for values that resolved, in request order.
    pub resolved: Vec<PickerOption>,
    /// Requested values that did not resolve.
    pub unresolved: Vec<String>,
    /// Contained failures, kept for diagnostics.
    pub failures: Vec<PickerError>,
}

impl LookupOutcome {
    fn from_resolved(requested: &[String], resolved: Vec<PickerOption>, failures: Vec<PickerError>) -> Self {
        let unresolved = requested
            .iter()
            .filter(|id| !resolved.iter().any(|option| &option.value == *id))
            .cloned()
            .collect();
        Self {
            resolved,
            unresolved,
            failures,
        }
    }

    fn all_unresolved(requested: &[String], failures: Vec<PickerError>) -> Self {
        Self {
            resolved: Vec::new(),
            unresolved: requested.to_vec(),
            failures,
        }
    }
}

/// Decision returned by [`SelectionResolver::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupDecision {
    /// No lookup needed, or the one in flight already covers the missing set.
    Idle,
    /// Run this plan; report its outcome with the ticket.
    Dispatch { ticket: LookupTicket, plan: LookupPlan },
    /// The adapter cannot resolve these values.
    Unresolvable(Vec<String>),
}

/// Bookkeeping for label resolution within one selection context.
///
/// A selection context lasts until the selection or session changes. Values
/// that failed to resolve are remembered for the rest of the context so they
/// are not looked up again without a new external trigger.
#[derive(Debug, Default)]
pub struct SelectionResolver {
    serial: u64,
    in_flight: Option<LookupTicket>,
    unresolved: HashSet<String>,
}

impl SelectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection context; any lookup in flight becomes stale.
    pub fn reset_context(&mut self) {
        self.in_flight = None;
        self.unresolved.clear();
    }

    /// Work out what to resolve for the current selection and store.
    pub fn plan(&mut self, selection: &SelectionSet, store: &ResultStore, capabilities: LookupCapabilities) -> LookupDecision {
        let missing: Vec<String> = missing_values(selection, store)
            .into_iter()
            .filter(|value| !self.unresolved.contains(value))
            .collect();

        if missing.is_empty() {
            self.in_flight = None;
            return LookupDecision::Idle;
        }
        if self.in_flight.as_ref().is_some_and(|ticket| ticket.missing == missing) {
            return LookupDecision::Idle;
        }

        match LookupPlan::for_missing(missing.clone(), capabilities) {
            LookupPlan::Idle => LookupDecision::Idle,
            LookupPlan::Unsupported(values) => {
                self.in_flight = None;
                self.unresolved.extend(values.iter().cloned());
                LookupDecision::Unresolvable(values)
            }
            plan => {
                self.serial += 1;
                let ticket = LookupTicket {
                    serial: self.serial,
                    missing,
                };
                self.in_flight = Some(ticket.clone());
                LookupDecision::Dispatch { ticket, plan }
            }
        }
    }

    /// Accept a completed lookup.
    ///
    /// Returns the options to inject, or `None` when the ticket was superseded.
    pub fn accept(&mut self, ticket: &LookupTicket, outcome: LookupOutcome) -> Option<Vec<PickerOption>> {
        if self.in_flight.as_ref() != Some(ticket) {
            debug!(serial = ticket.serial, "discarding superseded lookup");
            return None;
        }
        self.in_flight = None;
        self.unresolved.extend(outcome.unresolved);
        Some(outcome.resolved)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_unresolved(&self, value: &str) -> bool {
        self.unresolved.contains(value)
    }
}

/// Run `plan` against the adapter.
///
/// Single lookups run concurrently and fail independently. A failing bulk
/// lookup leaves every requested value unresolved; there is no per-item
/// fallback.
pub async fn execute_lookup<A: PickerAdapter>(adapter: &A, plan: &LookupPlan, timeout: Option<Duration>) -> LookupOutcome {
    match plan {
        LookupPlan::Idle => LookupOutcome::default(),
        LookupPlan::Unsupported(ids) => LookupOutcome::all_unresolved(ids, vec![PickerError::unsupported("value lookups")]),
        LookupPlan::Bulk(ids) => match with_deadline("get_by_ids", timeout, adapter.get_by_ids(ids)).await {
            Ok(Ok(items)) => {
                let resolved = ids
                    .iter()
                    .filter_map(|id| {
                        items
                            .iter()
                            .find(|item| adapter.value_of(item) == *id)
                            .map(|item| adapter.to_option(item))
                    })
                    .collect();
                LookupOutcome::from_resolved(ids, resolved, Vec::new())
            }
            Ok(Err(error)) => LookupOutcome::all_unresolved(ids, vec![PickerError::bulk_lookup(ids.len(), error)]),
            Err(elapsed) => LookupOutcome::all_unresolved(ids, vec![elapsed.into()]),
        },
        LookupPlan::PerItem(ids) => {
            let lookups = ids.iter().map(|id| async move {
                match with_deadline("get_by_id", timeout, adapter.get_by_id(id)).await {
                    Ok(Ok(item)) => Ok(item.map(|item| adapter.to_option(&item))),
                    Ok(Err(error)) => Err(PickerError::lookup(id.as_str(), error)),
                    Err(elapsed) => Err(elapsed.into()),
                }
            });

            let mut resolved = Vec::new();
            let mut failures = Vec::new();
            for result in join_all(lookups).await {
                match result {
                    Ok(Some(option)) => resolved.push(option),
                    Ok(None) => {}
                    Err(error) => failures.push(error),
                }
            }
            LookupOutcome::from_resolved(ids, resolved, failures)
        }
    }
}
