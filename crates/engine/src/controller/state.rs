//! Per-instance picker state and its transitions.
//!
//! Transitions never perform I/O. They update the record and return the
//! [`PickerEffect`]s the runner has to start.

use picker_types::{ListRequest, PageSignal, PickerConfig, PickerOption, SelectionMode, SelectionSet};
use serde_json::{Map as JsonMap, Value};
use tracing::{debug, warn};

use super::PickerSnapshot;
use crate::{
    FetchStamp, LookupCapabilities, PaginationState, PickerError, ResultStore, SessionKey, SessionTracker,
    presentation::exposed_value,
    selection::{LookupDecision, LookupOutcome, LookupPlan, LookupTicket, SelectionResolver},
};

/// Options of a loaded page together with its pagination signal.
#[derive(Debug, Clone)]
pub(crate) struct PageBatch {
    pub options: Vec<PickerOption>,
    pub signal: PageSignal,
}

/// Adapter work requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PickerEffect {
    FetchPage { stamp: FetchStamp, request: ListRequest },
    Lookup { ticket: LookupTicket, plan: LookupPlan },
}

#[derive(Debug)]
pub(crate) struct PickerState {
    mode: SelectionMode,
    debug: bool,
    capabilities: LookupCapabilities,
    search: String,
    params: Option<JsonMap<String, Value>>,
    dependency_token: Option<String>,
    selection: SelectionSet,
    tracker: SessionTracker,
    pagination: PaginationState,
    store: ResultStore,
    resolver: SelectionResolver,
}

impl PickerState {
    pub fn new(config: &PickerConfig, selection: SelectionSet, capabilities: LookupCapabilities) -> Self {
        Self {
            mode: config.selection_mode,
            debug: config.debug,
            capabilities,
            search: String::new(),
            params: config.params.clone(),
            dependency_token: config.dependency_token.clone(),
            selection,
            tracker: SessionTracker::new(),
            pagination: PaginationState::new(config.page_size),
            store: ResultStore::new(),
            resolver: SelectionResolver::new(),
        }
    }

    /// Open the first session.
    pub fn start(&mut self) -> Vec<PickerEffect> {
        self.sync_session(false)
    }

    pub fn on_search_settled(&mut self, term: String) -> Vec<PickerEffect> {
        self.search = term;
        self.sync_session(false)
    }

    pub fn on_params(&mut self, params: Option<JsonMap<String, Value>>) -> Vec<PickerEffect> {
        self.params = params;
        self.sync_session(false)
    }

    pub fn on_dependency_token(&mut self, token: Option<String>) -> Vec<PickerEffect> {
        self.dependency_token = token;
        self.sync_session(false)
    }

    pub fn on_selection(&mut self, selection: SelectionSet) -> Vec<PickerEffect> {
        if selection == self.selection {
            return Vec::new();
        }
        debug!(selected = selection.len(), "selection changed");
        self.selection = selection;
        self.resolver.reset_context();
        self.plan_lookup()
    }

    pub fn on_next_page(&mut self) -> Vec<PickerEffect> {
        match self.pagination.request_next_page() {
            Some(stamp) => vec![self.fetch_effect(stamp)],
            None => Vec::new(),
        }
    }

    /// Start a new session with unchanged inputs.
    pub fn reload(&mut self) -> Vec<PickerEffect> {
        self.sync_session(true)
    }

    pub fn on_page_loaded(&mut self, stamp: FetchStamp, result: Result<PageBatch, PickerError>) -> Vec<PickerEffect> {
        if !self.pagination.accepts(stamp) {
            debug!(page = stamp.page, generation = %stamp.generation, "discarding stale page");
            return Vec::new();
        }

        match result {
            Ok(batch) => {
                let received = batch.options.len();
                self.pagination.complete(stamp, batch.signal);
                if stamp.page == 1 {
                    self.store.replace_with_first_page(batch.options, &self.selection);
                } else {
                    self.store.append_page(batch.options);
                }
                debug!(
                    page = stamp.page,
                    generation = %stamp.generation,
                    received,
                    stored = self.store.len(),
                    has_more = self.pagination.has_more(),
                    "page fetch completed"
                );
                self.plan_lookup()
            }
            Err(error) => {
                self.pagination.fail(stamp);
                self.report_failure(&error);
                Vec::new()
            }
        }
    }

    pub fn on_lookup_resolved(&mut self, ticket: LookupTicket, mut outcome: LookupOutcome) -> Vec<PickerEffect> {
        let failures = std::mem::take(&mut outcome.failures);
        let unresolved = outcome.unresolved.len();
        let Some(resolved) = self.resolver.accept(&ticket, outcome) else {
            return Vec::new();
        };

        for failure in &failures {
            self.report_failure(failure);
        }
        let injected = self.store.inject_front(resolved);
        debug!(injected, unresolved, "lookup applied");
        self.plan_lookup()
    }

    pub fn snapshot(&self, settling: bool) -> PickerSnapshot {
        PickerSnapshot {
            options: self.store.options(),
            value: exposed_value(&self.selection, self.mode, &self.store),
            busy: self.pagination.is_fetching() || self.resolver.is_busy(),
            settling,
            page: self.pagination.page(),
            has_more: self.pagination.has_more(),
            search: self.search.clone(),
            generation: self.pagination.generation().get(),
        }
    }

    /// Reset the session when its key changed, or unconditionally when `force` is set.
    fn sync_session(&mut self, force: bool) -> Vec<PickerEffect> {
        let key = SessionKey::new(self.dependency_token.as_deref(), self.params.as_ref(), &self.search);
        let generation = match self.tracker.observe(key) {
            Some(generation) => generation,
            None if force => self.tracker.force_reset(),
            None => return Vec::new(),
        };

        debug!(generation = %generation, search = %self.search, "session reset");
        self.pagination.reset(generation);
        self.resolver.reset_context();
        let stamp = self.pagination.begin_first_page();

        let mut effects = vec![self.fetch_effect(stamp)];
        effects.extend(self.plan_lookup());
        effects
    }

    fn fetch_effect(&self, stamp: FetchStamp) -> PickerEffect {
        PickerEffect::FetchPage {
            stamp,
            request: ListRequest {
                page: stamp.page,
                page_size: self.pagination.page_size(),
                search: (!self.search.is_empty()).then(|| self.search.clone()),
                params: self.params.clone(),
            },
        }
    }

    fn plan_lookup(&mut self) -> Vec<PickerEffect> {
        match self.resolver.plan(&self.selection, &self.store, self.capabilities) {
            LookupDecision::Idle => Vec::new(),
            LookupDecision::Dispatch { ticket, plan } => {
                debug!(missing = ticket.missing().len(), plan = ?plan, "lookup planned");
                vec![PickerEffect::Lookup { ticket, plan }]
            }
            LookupDecision::Unresolvable(values) => {
                self.report_failure(&PickerError::unsupported("value lookups"));
                debug!(values = ?values, "selected values left without labels");
                Vec::new()
            }
        }
    }

    fn report_failure(&self, error: &PickerError) {
        if self.debug {
            warn!(error = %error, "picker adapter call failed");
        } else {
            debug!(error = %error, "picker adapter call failed");
        }
    }
}
