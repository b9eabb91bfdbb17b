//! Core data models
//!
//! The ledger is a flat set of [`Transaction`]s owned by one user session.
//! Records keep their `date` as the entered `YYYY-MM-DD` string; parsing
//! happens on demand so that a record with a bad date is still stored and
//! listed, it just drops out of date-keyed aggregates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a transaction is money out or money in
///
/// Records written before the income feature have no `type` field; those
/// deserialize as `Expense`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(format!("Unknown transaction kind: {}", other)),
        }
    }
}

/// A stored transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier
    pub id: i64,
    /// Calendar date as entered, ISO `YYYY-MM-DD`
    pub date: String,
    /// Item label, exactly as extracted or typed
    pub item: String,
    /// Category label, mutable by edit or re-learning
    pub category: String,
    /// Non-negative amount in the tracker's single currency
    pub price: f64,
    #[serde(default, rename = "type")]
    pub kind: TransactionKind,
}

impl Transaction {
    /// Parse the stored date, if valid
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// `YYYY-MM` grouping key, None when the date is invalid
    pub fn month_key(&self) -> Option<String> {
        self.parsed_date().map(|d| d.format("%Y-%m").to_string())
    }
}

/// A transaction awaiting insertion (no id yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    pub item: String,
    pub category: String,
    pub price: f64,
    #[serde(default, rename = "type")]
    pub kind: TransactionKind,
}

impl NewTransaction {
    /// Check the stored-record invariants before hitting the store
    pub fn validate(&self) -> Result<()> {
        if self.price < 0.0 || !self.price.is_finite() {
            return Err(Error::InvalidData(format!(
                "Price must be a non-negative number, got {}",
                self.price
            )));
        }
        if self.item.trim().is_empty() && self.category.trim().is_empty() {
            return Err(Error::InvalidData(
                "A transaction needs at least an item or a category".into(),
            ));
        }
        Ok(())
    }
}

/// An extraction-produced transaction candidate, not yet reconciled or saved
///
/// Same shape as [`NewTransaction`]; kept distinct so reconciliation has a
/// named input type and the wire format can evolve independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub date: String,
    pub item: String,
    pub price: f64,
    pub category: String,
    #[serde(default, rename = "type")]
    pub kind: TransactionKind,
}

impl From<CandidateRecord> for NewTransaction {
    fn from(c: CandidateRecord) -> Self {
        NewTransaction {
            date: c.date,
            item: c.item,
            category: c.category,
            price: c.price,
            kind: c.kind,
        }
    }
}

/// Partial update for merge-upsert edits
///
/// Absent fields preserve the stored values, matching the document-store
/// merge semantics of the persistence boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPatch {
    pub date: Option<String>,
    pub item: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
}

impl TransactionPatch {
    /// Apply this patch on top of an existing record
    pub fn apply(&self, existing: &Transaction) -> Transaction {
        Transaction {
            id: existing.id,
            date: self.date.clone().unwrap_or_else(|| existing.date.clone()),
            item: self.item.clone().unwrap_or_else(|| existing.item.clone()),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| existing.category.clone()),
            price: self.price.unwrap_or(existing.price),
            kind: self.kind.unwrap_or(existing.kind),
        }
    }
}

/// A complete point-in-time view of the ledger
///
/// The storage boundary always publishes full snapshots, never diffs, so
/// consumers get last-write-wins at the snapshot level.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// All transactions, sorted newest-first by date
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    /// Build a snapshot, sorting newest-first (invalid dates last)
    pub fn new(mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
            (Some(da), Some(db)) => db.cmp(&da).then(b.id.cmp(&a.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        });
        Self { transactions }
    }
}

/// Outcome of a best-effort batch insert
///
/// A failing record does not abort the batch; already-persisted records stay
/// persisted and callers get both lists back.
#[derive(Debug, Default)]
pub struct BatchInsertReport {
    pub inserted: Vec<Transaction>,
    pub failures: Vec<(NewTransaction, String)>,
}

impl BatchInsertReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}
