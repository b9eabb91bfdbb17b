//! Reconciliation of extracted candidates against learned categories
//!
//! Precedence, evaluated in order:
//! 1. Exact match: the candidate's normalized item exists in the knowledge
//!    base -> use that category unconditionally.
//! 2. Similarity match: a knowledge-base item is judged similar enough ->
//!    use its category.
//! 3. Fallback: keep the model-suggested category.
//!
//! Reconciliation runs client-side against the gateway's raw output. The
//! knowledge directives also travel in the prompt as context, which is safe:
//! every override here assigns a category *from* the knowledge base, so
//! re-applying the policy on output the model already biased is a no-op,
//! and the no-match branch keeps the model suggestion untouched.

use std::collections::HashMap;

use tracing::debug;

use crate::knowledge::{normalize_item, KnowledgeBase};
use crate::models::CandidateRecord;

/// Pluggable category resolution policy
pub trait CategoryResolver {
    /// Decide the final category for one candidate
    fn resolve(&self, candidate: &CandidateRecord, kb: &KnowledgeBase) -> String;
}

/// The default resolver: exact match, then similarity, then fallback
#[derive(Debug, Clone, Default)]
pub struct LearnedResolver;

impl CategoryResolver for LearnedResolver {
    fn resolve(&self, candidate: &CandidateRecord, kb: &KnowledgeBase) -> String {
        let key = normalize_item(&candidate.item);

        if let Some(category) = kb.category_for(&key) {
            debug!(item = %candidate.item, %category, "exact knowledge-base match");
            return category.to_string();
        }

        for (known_key, entry) in kb.iter() {
            if items_similar(&key, known_key) {
                debug!(
                    item = %candidate.item,
                    matched = %entry.item,
                    category = %entry.category,
                    "similar knowledge-base match"
                );
                return entry.category.clone();
            }
        }

        candidate.category.clone()
    }
}

/// Similarity test between two normalized item strings
///
/// One contains the other, or they share an alphanumeric word of at least
/// four characters that is not purely numeric. Deliberately coarse: the
/// knowledge base holds short item labels, not prose.
pub fn items_similar(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    // Containment only counts when the shorter label is substantial,
    // otherwise "tea" would match "teak table".
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.len() >= 4 && longer.contains(shorter) {
        return true;
    }

    let words = |s: &str| -> Vec<String> {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 4 && !w.chars().all(|c| c.is_numeric()))
            .map(|w| w.to_string())
            .collect()
    };
    let wa = words(a);
    let wb = words(b);
    wa.iter().any(|w1| wb.iter().any(|w2| w1 == w2))
}

/// Reconcile a whole extraction batch
///
/// Applies the resolver to every candidate and additionally pins duplicate
/// items within the batch to one category: if two candidates normalize to
/// the same item and the knowledge base is silent, the first resolution is
/// reused instead of letting model guesses diverge mid-batch.
pub fn reconcile_batch<R: CategoryResolver>(
    mut candidates: Vec<CandidateRecord>,
    kb: &KnowledgeBase,
    resolver: &R,
) -> Vec<CandidateRecord> {
    let mut batch_seen: HashMap<String, String> = HashMap::new();

    for candidate in &mut candidates {
        let key = normalize_item(&candidate.item);
        let category = match batch_seen.get(&key) {
            Some(prior) => prior.clone(),
            None => {
                let resolved = resolver.resolve(candidate, kb);
                batch_seen.insert(key, resolved.clone());
                resolved
            }
        };
        candidate.category = category;
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TransactionKind};

    fn kb_with(entries: &[(&str, &str)]) -> KnowledgeBase {
        let txs: Vec<Transaction> = entries
            .iter()
            .enumerate()
            .map(|(i, (item, category))| Transaction {
                id: i as i64 + 1,
                date: "2024-01-01".into(),
                item: (*item).into(),
                category: (*category).into(),
                price: 1.0,
                kind: TransactionKind::Expense,
            })
            .collect();
        KnowledgeBase::build(&txs)
    }

    fn candidate(item: &str, category: &str) -> CandidateRecord {
        CandidateRecord {
            date: "2024-06-01".into(),
            item: item.into(),
            price: 100.0,
            category: category.into(),
            kind: TransactionKind::Expense,
        }
    }

    #[test]
    fn exact_match_overrides_model_suggestion() {
        let kb = kb_with(&[("uber", "Transport")]);
        let resolver = LearnedResolver;
        let got = resolver.resolve(&candidate("Uber", "Rideshare"), &kb);
        assert_eq!(got, "Transport");
    }

    #[test]
    fn empty_knowledge_base_falls_back_unchanged() {
        let kb = KnowledgeBase::default();
        let resolver = LearnedResolver;
        let got = resolver.resolve(&candidate("croissant", "Bakery"), &kb);
        assert_eq!(got, "Bakery");
    }

    #[test]
    fn similar_item_borrows_learned_category() {
        let kb = kb_with(&[("uber ride", "Transport")]);
        let resolver = LearnedResolver;
        // No exact entry for "uber eats ride", but it shares "ride"
        let got = resolver.resolve(&candidate("evening ride", "Other"), &kb);
        assert_eq!(got, "Transport");
    }

    #[test]
    fn similarity_ignores_short_and_numeric_words() {
        assert!(!items_similar("cab 42", "taxi 42"));
        assert!(!items_similar("tea", "teak table"));
        assert!(items_similar("starbucks #4521", "starbucks coffee"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let kb = kb_with(&[("coffee", "Fuel")]);
        let resolver = LearnedResolver;
        let first = resolver.resolve(&candidate("Coffee", "Food"), &kb);
        let again = resolver.resolve(&candidate("Coffee", &first), &kb);
        assert_eq!(first, again);
        assert_eq!(again, "Fuel");
    }

    #[test]
    fn duplicate_items_in_batch_share_one_fallback() {
        let kb = KnowledgeBase::default();
        let batch = vec![
            candidate("mystery box", "Shopping"),
            candidate("Mystery Box ", "Entertainment"),
        ];
        let out = reconcile_batch(batch, &kb, &LearnedResolver);
        assert_eq!(out[0].category, "Shopping");
        assert_eq!(out[1].category, "Shopping");
    }

    #[test]
    fn batch_applies_knowledge_to_every_candidate() {
        let kb = kb_with(&[("coffee", "Fuel")]);
        let batch = vec![candidate("coffee", "Food"), candidate("uber", "Transport")];
        let out = reconcile_batch(batch, &kb, &LearnedResolver);
        assert_eq!(out[0].category, "Fuel");
        assert_eq!(out[1].category, "Transport");
    }
}
