//! Actor loop that owns a [`PickerState`] and executes its effects.
//!
//! Caller commands, adapter completions and settled search terms are
//! multiplexed with `tokio::select!`, so every transition runs on this task.
//! Adapter calls run on spawned tasks that report back over the completion
//! channel; a list fetch is aborted when a new one replaces it, as is a
//! superseded lookup.

use std::{sync::Arc, time::Duration};

use picker_types::ListRequest;
use picker_util::with_deadline;
use tokio::{
    sync::{
        mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
        watch,
    },
    task::JoinHandle,
};
use tracing::debug;

use super::{
    PickerSnapshot,
    handle::PickerCommand,
    state::{PageBatch, PickerEffect, PickerState},
};
use crate::{
    FetchStamp, PickerAdapter, PickerError, SearchDebouncer,
    debounce::SettledSearch,
    selection::{LookupOutcome, LookupPlan, LookupTicket, execute_lookup},
};

/// Adapter work reported back to the actor.
#[derive(Debug)]
enum Completion {
    Page {
        stamp: FetchStamp,
        result: Result<PageBatch, PickerError>,
    },
    Lookup {
        ticket: LookupTicket,
        outcome: LookupOutcome,
    },
}

pub(crate) struct PickerRunner<A: PickerAdapter> {
    adapter: Arc<A>,
    state: PickerState,
    request_timeout: Option<Duration>,
    debouncer: SearchDebouncer,
    settled_rx: UnboundedReceiver<SettledSearch>,
    completion_tx: UnboundedSender<Completion>,
    completion_rx: UnboundedReceiver<Completion>,
    snapshot_tx: watch::Sender<PickerSnapshot>,
    list_task: Option<JoinHandle<()>>,
    lookup_task: Option<JoinHandle<()>>,
}

impl<A: PickerAdapter> PickerRunner<A> {
    pub fn new(
        adapter: Arc<A>,
        state: PickerState,
        request_timeout: Option<Duration>,
        debounce_window: Duration,
        snapshot_tx: watch::Sender<PickerSnapshot>,
    ) -> Self {
        let (debouncer, settled_rx) = SearchDebouncer::channel(debounce_window);
        let (completion_tx, completion_rx) = unbounded_channel();
        Self {
            adapter,
            state,
            request_timeout,
            debouncer,
            settled_rx,
            completion_tx,
            completion_rx,
            snapshot_tx,
            list_task: None,
            lookup_task: None,
        }
    }

    /// Drive the picker until shutdown is requested or every handle is dropped.
    ///
    /// `start_effects` are the effects of opening the first session, already
    /// reflected in the published snapshot.
    pub async fn run(mut self, start_effects: Vec<PickerEffect>, mut command_rx: UnboundedReceiver<PickerCommand>) {
        self.apply(start_effects);
        self.publish();

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(completion) = self.completion_rx.recv() => {
                    let effects = match completion {
                        Completion::Page { stamp, result } => self.state.on_page_loaded(stamp, result),
                        Completion::Lookup { ticket, outcome } => self.state.on_lookup_resolved(ticket, outcome),
                    };
                    self.apply(effects);
                }
                Some(settled) = self.settled_rx.recv() => {
                    debug!(search = %settled.term, feed = settled.feed, "search settled");
                    self.debouncer.mark_settled(&settled);
                    let effects = self.state.on_search_settled(settled.term);
                    self.apply(effects);
                }
            }
            self.publish();
        }

        self.teardown();
    }

    /// Apply one caller command. Returns `false` when the actor should stop.
    fn handle_command(&mut self, command: PickerCommand) -> bool {
        let effects = match command {
            PickerCommand::SearchInput(term) => {
                self.debouncer.feed(term);
                Vec::new()
            }
            PickerCommand::Params(params) => self.state.on_params(params),
            PickerCommand::DependencyToken(token) => self.state.on_dependency_token(token),
            PickerCommand::Selection(selection) => self.state.on_selection(selection),
            PickerCommand::NextPage => self.state.on_next_page(),
            PickerCommand::Reload => self.state.reload(),
            PickerCommand::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot(self.settling()));
                Vec::new()
            }
            PickerCommand::Shutdown => return false,
        };
        self.apply(effects);
        true
    }

    fn apply(&mut self, effects: Vec<PickerEffect>) {
        for effect in effects {
            match effect {
                PickerEffect::FetchPage { stamp, request } => self.spawn_fetch(stamp, request),
                PickerEffect::Lookup { ticket, plan } => self.spawn_lookup(ticket, plan),
            }
        }
    }

    fn spawn_fetch(&mut self, stamp: FetchStamp, request: ListRequest) {
        if let Some(task) = self.list_task.take() {
            task.abort();
        }
        debug!(page = stamp.page, generation = %stamp.generation, "page fetch started");

        let adapter = Arc::clone(&self.adapter);
        let completion_tx = self.completion_tx.clone();
        let request_timeout = self.request_timeout;
        self.list_task = Some(tokio::spawn(async move {
            let page = request.page;
            let result = match with_deadline("list", request_timeout, adapter.list(request)).await {
                Ok(Ok(response)) => Ok(PageBatch {
                    options: response.items.iter().map(|item| adapter.to_option(item)).collect(),
                    signal: response.signal,
                }),
                Ok(Err(error)) => Err(PickerError::fetch(page, error)),
                Err(elapsed) => Err(elapsed.into()),
            };
            let _ = completion_tx.send(Completion::Page { stamp, result });
        }));
    }

    fn spawn_lookup(&mut self, ticket: LookupTicket, plan: LookupPlan) {
        if let Some(task) = self.lookup_task.take() {
            task.abort();
        }

        let adapter = Arc::clone(&self.adapter);
        let completion_tx = self.completion_tx.clone();
        let request_timeout = self.request_timeout;
        self.lookup_task = Some(tokio::spawn(async move {
            let outcome = execute_lookup(adapter.as_ref(), &plan, request_timeout).await;
            let _ = completion_tx.send(Completion::Lookup { ticket, outcome });
        }));
    }

    /// A search term has been typed but not yet applied.
    fn settling(&self) -> bool {
        self.debouncer.is_pending() || !self.settled_rx.is_empty()
    }

    fn publish(&self) {
        let snapshot = self.state.snapshot(self.settling());
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    fn teardown(&mut self) {
        debug!("picker shutting down");
        self.debouncer.cancel();
        for task in [self.list_task.take(), self.lookup_task.take()].into_iter().flatten() {
            task.abort();
        }
    }
}
