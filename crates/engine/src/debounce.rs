//! Trailing-edge debouncing of free-text search input.
//!
//! Each [`SearchDebouncer::feed`] aborts the pending timer and schedules a
//! new one; only the last term of an unbroken burst is emitted, one quiet
//! window after the final keystroke. There is no leading-edge emission.

use std::time::Duration;

use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
    time::sleep,
};

/// A term that outlived its quiet window, stamped with the feed that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledSearch {
    pub feed: u64,
    pub term: String,
}

/// Owned, cancellable debounce timer emitting settled search terms.
#[derive(Debug)]
pub struct SearchDebouncer {
    window: Duration,
    settled_tx: UnboundedSender<SettledSearch>,
    pending: Option<JoinHandle<()>>,
    feeds: u64,
    pending_feed: Option<u64>,
}

impl SearchDebouncer {
    /// Create a debouncer that delivers settled terms to `settled_tx`.
    pub fn new(window: Duration, settled_tx: UnboundedSender<SettledSearch>) -> Self {
        Self {
            window,
            settled_tx,
            pending: None,
            feeds: 0,
            pending_feed: None,
        }
    }

    /// Create a debouncer together with the receiver of its settled terms.
    pub fn channel(window: Duration) -> (Self, UnboundedReceiver<SettledSearch>) {
        let (settled_tx, settled_rx) = unbounded_channel();
        (Self::new(window, settled_tx), settled_rx)
    }

    /// Schedule `term` for emission, replacing any pending term.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn feed(&mut self, term: impl Into<String>) {
        self.cancel();
        self.feeds += 1;
        let settled = SettledSearch {
            feed: self.feeds,
            term: term.into(),
        };
        let window = self.window;
        let settled_tx = self.settled_tx.clone();
        self.pending_feed = Some(settled.feed);
        self.pending = Some(tokio::spawn(async move {
            sleep(window).await;
            let _ = settled_tx.send(settled);
        }));
    }

    /// Drop the pending term, if any.
    pub fn cancel(&mut self) {
        self.pending_feed = None;
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// Record that `settled` was received from the settled channel.
    ///
    /// The timer task may still be winding down after sending; once the
    /// receiver has seen the emission of the latest feed nothing is pending.
    /// Emissions of earlier feeds leave a newer timer pending.
    pub fn mark_settled(&mut self, settled: &SettledSearch) {
        if self.pending_feed == Some(settled.feed) {
            self.pending_feed = None;
        }
    }

    /// Whether a fed term is still waiting for its quiet window.
    pub fn is_pending(&self) -> bool {
        self.pending_feed.is_some() && self.pending.as_ref().is_some_and(|pending| !pending.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
