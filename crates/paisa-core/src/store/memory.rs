//! In-memory ledger store
//!
//! Used by tests and demos. Mirrors the SQLite store's snapshot-publishing
//! behavior exactly, so pipeline tests exercise the real subscription path.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::models::{LedgerSnapshot, NewTransaction, Transaction, TransactionPatch};

use super::LedgerStore;

pub struct MemoryStore {
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<LedgerSnapshot>,
    budget_tx: watch::Sender<f64>,
}

struct Inner {
    transactions: Vec<Transaction>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(LedgerSnapshot::default());
        let (budget_tx, _) = watch::channel(0.0);
        Self {
            inner: Mutex::new(Inner {
                transactions: Vec::new(),
                next_id: 1,
            }),
            snapshot_tx,
            budget_tx,
        }
    }

    /// Seed with existing history (ids must be unique)
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().expect("memory store poisoned");
            inner.next_id = transactions.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            inner.transactions = transactions;
        }
        store.publish();
        store
    }

    fn publish(&self) {
        let transactions = {
            let inner = self.inner.lock().expect("memory store poisoned");
            inner.transactions.clone()
        };
        self.snapshot_tx
            .send_replace(LedgerSnapshot::new(transactions));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    fn subscribe(&self) -> watch::Receiver<LedgerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn subscribe_budget(&self) -> watch::Receiver<f64> {
        self.budget_tx.subscribe()
    }

    async fn insert(&self, record: NewTransaction) -> Result<Transaction> {
        record.validate()?;
        let tx = {
            let mut inner = self.inner.lock().expect("memory store poisoned");
            let tx = Transaction {
                id: inner.next_id,
                date: record.date,
                item: record.item,
                category: record.category,
                price: record.price,
                kind: record.kind,
            };
            inner.next_id += 1;
            inner.transactions.push(tx.clone());
            tx
        };
        self.publish();
        Ok(tx)
    }

    async fn replace(&self, id: i64, patch: TransactionPatch) -> Result<Transaction> {
        let updated = {
            let mut inner = self.inner.lock().expect("memory store poisoned");
            let existing = inner
                .transactions
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;
            let updated = patch.apply(existing);
            *existing = updated.clone();
            updated
        };
        self.publish();
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        {
            let mut inner = self.inner.lock().expect("memory store poisoned");
            let before = inner.transactions.len();
            inner.transactions.retain(|t| t.id != id);
            if inner.transactions.len() == before {
                return Err(Error::NotFound(format!("transaction {}", id)));
            }
        }
        self.publish();
        Ok(())
    }

    async fn save_budget(&self, amount: f64) -> Result<()> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Budget must be a non-negative number, got {}",
                amount
            )));
        }
        self.budget_tx.send_replace(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn record(item: &str) -> NewTransaction {
        NewTransaction {
            date: "2025-01-15".into(),
            item: item.into(),
            category: "Food".into(),
            price: 10.0,
            kind: TransactionKind::Expense,
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_publishes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        let a = store.insert(record("a")).await.unwrap();
        let b = store.insert(record("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().transactions.len(), 2);
    }

    #[tokio::test]
    async fn replace_merges_patch() {
        let store = MemoryStore::new();
        let tx = store.insert(record("coffee")).await.unwrap();

        let updated = store
            .replace(
                tx.id,
                TransactionPatch {
                    price: Some(99.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 99.0);
        assert_eq!(updated.item, "coffee");
    }

    #[tokio::test]
    async fn delete_missing_id_errors() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete(42).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn budget_updates_flow_to_subscribers() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe_budget();
        store.save_budget(5000.0).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 5000.0);
    }

    #[tokio::test]
    async fn negative_budget_rejected() {
        let store = MemoryStore::new();
        assert!(store.save_budget(-1.0).await.is_err());
    }
}
