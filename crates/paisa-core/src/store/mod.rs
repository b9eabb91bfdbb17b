//! Ledger storage boundary
//!
//! A [`LedgerStore`] behaves like the document database the app syncs
//! against: consumers subscribe to a stream of *full* snapshots (never
//! diffs) and mutate through per-record CRUD calls. Each call is atomic for
//! its one record; concurrent batches are safe because every insert gets its
//! own id.
//!
//! Stores are constructed per user session, so the methods carry no user id.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::models::{
    BatchInsertReport, LedgerSnapshot, NewTransaction, Transaction, TransactionPatch,
};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence boundary for one user's ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Subscribe to full ledger snapshots
    ///
    /// The receiver always holds the latest complete snapshot; intermediate
    /// snapshots may be skipped (last-write-wins).
    fn subscribe(&self) -> watch::Receiver<LedgerSnapshot>;

    /// Subscribe to the monthly budget scalar (0 when unset)
    fn subscribe_budget(&self) -> watch::Receiver<f64>;

    /// Subscribe to listener/sync failures
    ///
    /// Carries a human-readable notice when the snapshot stream may be
    /// stale. The default channel never fires; local stores have no remote
    /// listener to lose.
    fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        let (_tx, rx) = watch::channel(None);
        rx
    }

    /// Insert one record; the store assigns the id
    async fn insert(&self, record: NewTransaction) -> Result<Transaction>;

    /// Merge-upsert one record: absent patch fields keep stored values
    async fn replace(&self, id: i64, patch: TransactionPatch) -> Result<Transaction>;

    /// Delete one record
    async fn delete(&self, id: i64) -> Result<()>;

    /// Persist the monthly budget
    async fn save_budget(&self, amount: f64) -> Result<()>;
}

/// Best-effort batch insert
///
/// Each record is inserted independently; one failure does not abort the
/// rest and nothing is rolled back. The report carries both outcomes so the
/// caller can tell the user exactly what happened.
pub async fn insert_batch<S: LedgerStore + ?Sized>(
    store: &S,
    records: Vec<NewTransaction>,
) -> BatchInsertReport {
    let mut report = BatchInsertReport::default();
    for record in records {
        match store.insert(record.clone()).await {
            Ok(tx) => report.inserted.push(tx),
            Err(e) => report.failures.push((record, e.to_string())),
        }
    }
    report
}
