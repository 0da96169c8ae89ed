use std::sync::Arc;

use picker_types::{PickerConfig, SelectionSet};
use serde_json::{Map as JsonMap, Value};
use tokio::sync::{
    mpsc::{UnboundedSender, unbounded_channel},
    oneshot, watch,
};
use tracing::debug;

use super::{PickerSnapshot, runner::PickerRunner, state::PickerState};
use crate::{PickerAdapter, PickerError};

/// Commands accepted by the picker actor.
#[derive(Debug)]
pub(crate) enum PickerCommand {
    SearchInput(String),
    Params(Option<JsonMap<String, Value>>),
    DependencyToken(Option<String>),
    Selection(SelectionSet),
    NextPage,
    Reload,
    Snapshot(oneshot::Sender<PickerSnapshot>),
    Shutdown,
}

/// Cloneable handle to a running picker.
///
/// Every setter enqueues a command and returns immediately; commands are
/// applied in the order they were sent. Dropping the last handle stops the
/// picker.
#[derive(Debug, Clone)]
pub struct PickerHandle {
    command_tx: UnboundedSender<PickerCommand>,
    snapshot_rx: watch::Receiver<PickerSnapshot>,
}

/// Spawn a picker actor for `adapter` and start loading the first page.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
/// Returns [`PickerError::Config`] when `config` fails validation.
pub fn spawn_picker<A: PickerAdapter>(
    adapter: Arc<A>,
    config: PickerConfig,
    selection: SelectionSet,
) -> Result<PickerHandle, PickerError> {
    config.validate()?;

    let mut state = PickerState::new(&config, selection, adapter.capabilities());
    let start_effects = state.start();
    let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot(false));
    let (command_tx, command_rx) = unbounded_channel();
    let runner = PickerRunner::new(
        adapter,
        state,
        config.request_timeout(),
        config.debounce_window(),
        snapshot_tx,
    );

    debug!(page_size = config.page_size, mode = ?config.selection_mode, "spawning picker");
    tokio::spawn(runner.run(start_effects, command_rx));
    Ok(PickerHandle { command_tx, snapshot_rx })
}

impl PickerHandle {
    /// Feed raw search input; it is applied once the debounce window passes.
    pub fn set_search_input(&self, term: impl Into<String>) -> Result<(), PickerError> {
        self.send(PickerCommand::SearchInput(term.into()))
    }

    pub fn set_params(&self, params: Option<JsonMap<String, Value>>) -> Result<(), PickerError> {
        self.send(PickerCommand::Params(params))
    }

    pub fn set_dependency_token(&self, token: Option<String>) -> Result<(), PickerError> {
        self.send(PickerCommand::DependencyToken(token))
    }

    pub fn set_selection(&self, selection: SelectionSet) -> Result<(), PickerError> {
        self.send(PickerCommand::Selection(selection))
    }

    /// Ask for the next page. Ignored while a fetch is running or paging is exhausted.
    pub fn request_next_page(&self) -> Result<(), PickerError> {
        self.send(PickerCommand::NextPage)
    }

    /// Start a new session with the current inputs.
    pub fn reload(&self) -> Result<(), PickerError> {
        self.send(PickerCommand::Reload)
    }

    /// Snapshot taken after every previously sent command has been applied.
    pub async fn snapshot(&self) -> Result<PickerSnapshot, PickerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(PickerCommand::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| PickerError::Closed)
    }

    /// Receiver of every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PickerSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Most recently published snapshot, without waiting on the actor.
    pub fn latest(&self) -> PickerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_until(&self, mut predicate: impl FnMut(&PickerSnapshot) -> bool) -> Result<PickerSnapshot, PickerError> {
        let mut snapshot_rx = self.snapshot_rx.clone();
        let snapshot = snapshot_rx
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| PickerError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Wait until every sent command has been applied and no fetch, lookup
    /// or search term is pending.
    pub async fn idle(&self) -> Result<PickerSnapshot, PickerError> {
        self.snapshot().await?;
        self.wait_until(|snapshot| !snapshot.busy && !snapshot.settling).await
    }

    /// Stop the picker; outstanding adapter calls are aborted.
    pub fn shutdown(&self) -> Result<(), PickerError> {
        self.send(PickerCommand::Shutdown)
    }

    fn send(&self, command: PickerCommand) -> Result<(), PickerError> {
        self.command_tx.send(command).map_err(|_| PickerError::Closed)
    }
}
