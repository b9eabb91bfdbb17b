//! SQLite-backed ledger store
//!
//! Pooled connections via r2d2. One `transactions` table plus a `settings`
//! row for the budget. Every mutation reloads the full table and publishes a
//! fresh snapshot, matching the snapshot-stream contract of the boundary.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tokio::sync::watch;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{
    LedgerSnapshot, NewTransaction, Transaction, TransactionKind, TransactionPatch,
};

use super::LedgerStore;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    item TEXT NOT NULL,
    category TEXT NOT NULL,
    price REAL NOT NULL,
    kind TEXT NOT NULL DEFAULT 'expense'
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const BUDGET_KEY: &str = "budget";

pub struct SqliteStore {
    pool: DbPool,
    snapshot_tx: watch::Sender<LedgerSnapshot>,
    budget_tx: watch::Sender<f64>,
}

impl SqliteStore {
    /// Open (or create) a ledger database at `path`
    pub fn open(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(4).build(manager)?;

        {
            let conn = pool.get()?;
            conn.execute_batch(SCHEMA)?;
        }
        info!(path, "Opened ledger database");

        let (snapshot_tx, _) = watch::channel(LedgerSnapshot::default());
        let (budget_tx, _) = watch::channel(0.0);
        let store = Self {
            pool,
            snapshot_tx,
            budget_tx,
        };
        store.publish()?;
        store
            .budget_tx
            .send_replace(store.load_budget()?);
        Ok(store)
    }

    /// Open an in-memory database (tests)
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        {
            let conn = pool.get()?;
            conn.execute_batch(SCHEMA)?;
        }
        let (snapshot_tx, _) = watch::channel(LedgerSnapshot::default());
        let (budget_tx, _) = watch::channel(0.0);
        Ok(Self {
            pool,
            snapshot_tx,
            budget_tx,
        })
    }

    fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn load_all(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, date, item, category, price, kind FROM transactions")?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(5)?;
            Ok(Transaction {
                id: row.get(0)?,
                date: row.get(1)?,
                item: row.get(2)?,
                category: row.get(3)?,
                price: row.get(4)?,
                kind: kind.parse().unwrap_or(TransactionKind::Expense),
            })
        })?;
        let mut transactions = Vec::new();
        for row in rows {
            transactions.push(row?);
        }
        Ok(transactions)
    }

    fn load_one(&self, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, date, item, category, price, kind FROM transactions WHERE id = ?",
            params![id],
            |row| {
                let kind: String = row.get(5)?;
                Ok(Transaction {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    item: row.get(2)?,
                    category: row.get(3)?,
                    price: row.get(4)?,
                    kind: kind.parse().unwrap_or(TransactionKind::Expense),
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("transaction {}", id))
            }
            other => Error::Database(other),
        })
    }

    fn load_budget(&self) -> Result<f64> {
        let conn = self.conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![BUDGET_KEY],
                |row| row.get(0),
            )
            .ok();
        Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0.0))
    }

    fn publish(&self) -> Result<()> {
        let transactions = self.load_all()?;
        self.snapshot_tx
            .send_replace(LedgerSnapshot::new(transactions));
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    fn subscribe(&self) -> watch::Receiver<LedgerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn subscribe_budget(&self) -> watch::Receiver<f64> {
        self.budget_tx.subscribe()
    }

    async fn insert(&self, record: NewTransaction) -> Result<Transaction> {
        record.validate()?;
        let id = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO transactions (date, item, category, price, kind) VALUES (?, ?, ?, ?, ?)",
                params![
                    record.date,
                    record.item,
                    record.category,
                    record.price,
                    record.kind.as_str(),
                ],
            )?;
            conn.last_insert_rowid()
        };
        self.publish()?;
        Ok(Transaction {
            id,
            date: record.date,
            item: record.item,
            category: record.category,
            price: record.price,
            kind: record.kind,
        })
    }

    async fn replace(&self, id: i64, patch: TransactionPatch) -> Result<Transaction> {
        let existing = self.load_one(id)?;
        let updated = patch.apply(&existing);
        {
            let conn = self.conn()?;
            conn.execute(
                "UPDATE transactions SET date = ?, item = ?, category = ?, price = ?, kind = ? WHERE id = ?",
                params![
                    updated.date,
                    updated.item,
                    updated.category,
                    updated.price,
                    updated.kind.as_str(),
                    id,
                ],
            )?;
        }
        self.publish()?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let affected = {
            let conn = self.conn()?;
            conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?
        };
        if affected == 0 {
            return Err(Error::NotFound(format!("transaction {}", id)));
        }
        self.publish()?;
        Ok(())
    }

    async fn save_budget(&self, amount: f64) -> Result<()> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Budget must be a non-negative number, got {}",
                amount
            )));
        }
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![BUDGET_KEY, amount.to_string()],
            )?;
        }
        self.budget_tx.send_replace(amount);
        Ok(())
    }
}
