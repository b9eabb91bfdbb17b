//! Knowledge base of learned item -> category preferences
//!
//! Scans the transaction history and keeps, for every distinct item, the
//! category of its most recent occurrence. The result is injected into
//! extraction prompts as natural-language directives and consulted during
//! reconciliation.
//!
//! This is pure derived state: it is rebuilt from the full history on every
//! use, never patched incrementally, because a deletion or edit can change
//! which record is "most recent" for an item.

use std::collections::HashMap;

use crate::models::Transaction;

/// One learned mapping
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    /// Item text with its original casing, for prompt readability
    pub item: String,
    /// The category the user most recently had for this item
    pub category: String,
}

/// Derived item -> category mapping, keyed on the normalized item
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, KnowledgeEntry>,
}

/// Normalize an item for matching: lowercase, trimmed
///
/// No stemming and no fuzzy matching here; similarity is the reconciler's
/// concern.
pub fn normalize_item(item: &str) -> String {
    item.trim().to_lowercase()
}

impl KnowledgeBase {
    /// Build from the full transaction history
    ///
    /// Input order does not matter: records are sorted most-recent-first by
    /// date before the first-seen-wins pass, so the newest categorization of
    /// an item always takes precedence. Records with an unparseable date
    /// sort last and can only seed an item no dated record mentions.
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let mut entries = HashMap::new();
        for tx in ordered {
            if tx.item.trim().is_empty() || tx.category.trim().is_empty() {
                continue;
            }
            let key = normalize_item(&tx.item);
            entries.entry(key).or_insert_with(|| KnowledgeEntry {
                item: tx.item.trim().to_string(),
                category: tx.category.clone(),
            });
        }
        Self { entries }
    }

    /// Look up the learned category for an item (any casing/padding)
    pub fn category_for(&self, item: &str) -> Option<&str> {
        self.entries
            .get(&normalize_item(item))
            .map(|e| e.category.as_str())
    }

    /// Iterate (normalized key, entry) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &KnowledgeEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize for prompt injection: `"Item": "Category"` pairs joined
    /// with `", "`, original item casing preserved
    ///
    /// Sorted by key so the directive string is stable across rebuilds.
    pub fn directives(&self) -> String {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        keys.iter()
            .map(|k| {
                let e = &self.entries[*k];
                format!("\"{}\": \"{}\"", e.item, e.category)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn tx(id: i64, date: &str, item: &str, category: &str) -> Transaction {
        Transaction {
            id,
            date: date.into(),
            item: item.into(),
            category: category.into(),
            price: 10.0,
            kind: TransactionKind::Expense,
        }
    }

    #[test]
    fn most_recent_category_wins() {
        let txs = vec![
            tx(1, "2024-01-01", "tea", "Beverage"),
            tx(2, "2024-06-01", "Tea", "Snacks"),
        ];
        let kb = KnowledgeBase::build(&txs);
        assert_eq!(kb.category_for("tea"), Some("Snacks"));

        // Input order must not matter
        let reversed: Vec<Transaction> = txs.into_iter().rev().collect();
        let kb = KnowledgeBase::build(&reversed);
        assert_eq!(kb.category_for("tea"), Some("Snacks"));
    }

    #[test]
    fn normalization_merges_casing_and_padding() {
        let txs = vec![
            tx(1, "2024-01-01", "Coffee ", "Food"),
            tx(2, "2024-01-02", "coffee", "Food"),
            tx(3, "2024-01-03", " COFFEE", "Food"),
        ];
        let kb = KnowledgeBase::build(&txs);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.category_for("COFFEE  "), Some("Food"));
    }

    #[test]
    fn empty_item_or_category_skipped() {
        let txs = vec![
            tx(1, "2024-01-01", "", "Food"),
            tx(2, "2024-01-02", "chai", "  "),
            tx(3, "2024-01-03", "chai", "Beverage"),
        ];
        let kb = KnowledgeBase::build(&txs);
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.category_for("chai"), Some("Beverage"));
    }

    #[test]
    fn undated_record_never_outranks_dated_one() {
        let txs = vec![
            tx(1, "garbage", "uber", "Rideshare"),
            tx(2, "2023-01-01", "uber", "Transport"),
        ];
        let kb = KnowledgeBase::build(&txs);
        assert_eq!(kb.category_for("uber"), Some("Transport"));
    }

    #[test]
    fn directives_preserve_original_casing() {
        let txs = vec![tx(1, "2024-01-01", "Uber Ride", "Transport")];
        let kb = KnowledgeBase::build(&txs);
        assert_eq!(kb.directives(), r#""Uber Ride": "Transport""#);
    }

    #[test]
    fn directives_join_multiple_entries() {
        let txs = vec![
            tx(1, "2024-01-01", "coffee", "Food"),
            tx(2, "2024-01-01", "uber", "Transport"),
        ];
        let kb = KnowledgeBase::build(&txs);
        assert_eq!(kb.directives(), r#""coffee": "Food", "uber": "Transport""#);
    }
}
