//! Session lifecycle and live ledger aggregation
//!
//! A [`Session`] is the in-memory owner of one user's ledger view. It
//! attaches to the store's snapshot and budget subscriptions, funnels every
//! change through a 250 ms trailing-edge [`Debouncer`], and republishes a
//! freshly recomputed [`LedgerSummary`] after each quiet period. Teardown
//! detaches the listeners deterministically before the state is dropped, so
//! no stale callback can touch a cleared session.
//!
//! Lifecycle: `Idle` -> `Loaded` (attach) -> recompute on updates -> `Idle`
//! (close/drop).

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::knowledge::KnowledgeBase;
use crate::ledger::{summarize, LedgerSummary};
use crate::models::LedgerSnapshot;
use crate::store::LedgerStore;

/// Quiet window for coalescing bursts of store updates
const RECOMPUTE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No listeners attached
    Idle,
    /// Listeners attached, summary live
    Loaded,
}

/// Live, debounced view over one user's ledger
pub struct Session {
    snapshot_rx: watch::Receiver<LedgerSnapshot>,
    summary_rx: watch::Receiver<LedgerSummary>,
    sync_error_rx: watch::Receiver<Option<String>>,
    state_tx: watch::Sender<SessionState>,
    task: JoinHandle<()>,
    // Held so the poke channel stays open for the lifetime of the session
    _debouncer: Arc<Debouncer>,
}

impl Session {
    /// Attach to a store, using the local calendar date for "current month"
    pub fn attach(store: Arc<dyn LedgerStore>) -> Self {
        Self::attach_with_today(store, || chrono::Local::now().date_naive())
    }

    /// Attach with an injected clock (tests)
    pub fn attach_with_today<F>(store: Arc<dyn LedgerStore>, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        let mut snapshot_rx = store.subscribe();
        let mut budget_rx = store.subscribe_budget();
        let sync_error_rx = store.subscribe_errors();

        let initial = summarize(
            &snapshot_rx.borrow().transactions,
            *budget_rx.borrow(),
            today(),
        );
        let (summary_tx, summary_rx) = watch::channel(initial);
        let (state_tx, _) = watch::channel(SessionState::Loaded);

        let (debouncer, mut fire_rx) = Debouncer::new(RECOMPUTE_DEBOUNCE);
        let debouncer = Arc::new(debouncer);

        let task = {
            let poke = debouncer.clone();
            let mut snapshot_rx = snapshot_rx.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        changed = snapshot_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            poke.poke();
                        }
                        changed = budget_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            poke.poke();
                        }
                        fired = fire_rx.recv() => {
                            if fired.is_none() {
                                break;
                            }
                            let summary = summarize(
                                &snapshot_rx.borrow_and_update().transactions,
                                *budget_rx.borrow_and_update(),
                                today(),
                            );
                            debug!(
                                month_expense = summary.month_expense,
                                "Recomputed ledger summary"
                            );
                            if summary_tx.send(summary).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
        };

        // Prime the borrow cursor so attach-time state counts as seen
        let _ = snapshot_rx.borrow_and_update();

        Self {
            snapshot_rx,
            summary_rx,
            sync_error_rx,
            state_tx,
            task,
            _debouncer: debouncer,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to recomputed summaries
    pub fn summary(&self) -> watch::Receiver<LedgerSummary> {
        self.summary_rx.clone()
    }

    /// The latest summary value
    pub fn current_summary(&self) -> LedgerSummary {
        self.summary_rx.borrow().clone()
    }

    /// Non-fatal "sync may be stale" notice channel
    pub fn sync_errors(&self) -> watch::Receiver<Option<String>> {
        self.sync_error_rx.clone()
    }

    /// Build a call-scoped knowledge base from the latest snapshot
    ///
    /// Rebuilt on every call; never cached across extraction requests.
    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase::build(&self.snapshot_rx.borrow().transactions)
    }

    /// Detach listeners and return to Idle
    pub fn close(self) {
        self.state_tx.send_replace(SessionState::Idle);
        self.task.abort();
        // Debouncer drop aborts its timer task
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.state_tx.send_replace(SessionState::Idle);
        self.task.abort();
    }
}
