//! End-to-end analysis pipeline: notes -> extraction -> reconciliation ->
//! persistence -> aggregation

use std::sync::Arc;

use chrono::NaiveDate;
use paisa_core::store::insert_batch;
use paisa_core::{
    reconcile_batch, ExtractionRequest, Extractor, ExtractorClient, KnowledgeBase,
    LearnedResolver, LedgerStore, MemoryStore, NewTransaction, Session, Transaction,
    TransactionKind,
};

fn nov5() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 5).unwrap()
}

fn history(id: i64, date: &str, item: &str, category: &str) -> Transaction {
    Transaction {
        id,
        date: date.into(),
        item: item.into(),
        category: category.into(),
        price: 100.0,
        kind: TransactionKind::Expense,
    }
}

#[tokio::test]
async fn notes_become_dated_categorized_ledger_entries() {
    let store = Arc::new(MemoryStore::new());
    let extractor = ExtractorClient::mock();

    let kb = KnowledgeBase::build(&store.subscribe().borrow().transactions);
    let request = ExtractionRequest::new("coffee 150 yesterday, Uber 450 today", nov5())
        .with_knowledge(kb.directives());

    let candidates = extractor.extract(&request).await.unwrap();
    let reconciled = reconcile_batch(candidates, &kb, &LearnedResolver);
    assert_eq!(reconciled.len(), 2);

    assert_eq!(reconciled[0].date, "2025-11-04");
    assert_eq!(reconciled[1].date, "2025-11-05");
    for candidate in &reconciled {
        assert!(candidate.price > 0.0);
        assert!(!candidate.category.is_empty());
    }

    let records: Vec<NewTransaction> = reconciled.into_iter().map(Into::into).collect();
    let report = insert_batch(store.as_ref(), records).await;
    assert!(report.all_ok());
    assert_eq!(store.subscribe().borrow().transactions.len(), 2);
}

#[tokio::test]
async fn learned_category_overrides_the_model_suggestion() {
    // A prior joke mapping: coffee was filed under Fuel
    let store = Arc::new(MemoryStore::with_transactions(vec![history(
        1,
        "2025-10-01",
        "coffee",
        "Fuel",
    )]));
    let extractor = ExtractorClient::mock();

    let kb = KnowledgeBase::build(&store.subscribe().borrow().transactions);
    let request = ExtractionRequest::new("coffee 150 yesterday, Uber 450 today", nov5())
        .with_knowledge(kb.directives());

    let candidates = extractor.extract(&request).await.unwrap();
    let reconciled = reconcile_batch(candidates, &kb, &LearnedResolver);

    let coffee = reconciled.iter().find(|c| c.item == "coffee").unwrap();
    assert_eq!(coffee.category, "Fuel");

    // Uber has no history; the model's suggestion stands
    let uber = reconciled.iter().find(|c| c.item == "Uber").unwrap();
    assert_eq!(uber.category, "Transport");
}

#[tokio::test(start_paused = true)]
async fn analysis_batch_refreshes_the_live_summary() {
    let store = Arc::new(MemoryStore::new());
    let session = Session::attach_with_today(store.clone(), nov5);
    let mut summaries = session.summary();

    let extractor = ExtractorClient::mock();
    let kb = session.knowledge_base();
    let request = ExtractionRequest::new("coffee 150 yesterday, Uber 450 today", nov5())
        .with_knowledge(kb.directives());

    let candidates = extractor.extract(&request).await.unwrap();
    let reconciled = reconcile_batch(candidates, &kb, &LearnedResolver);
    let report = insert_batch(
        store.as_ref(),
        reconciled.into_iter().map(Into::into).collect(),
    )
    .await;
    assert!(report.all_ok());

    summaries.changed().await.unwrap();
    let summary = summaries.borrow().clone();
    assert_eq!(summary.month_expense, 600.0);
    assert_eq!(summary.net_balance, -600.0);
}

#[tokio::test]
async fn relearning_follows_the_most_recent_edit() {
    let store = Arc::new(MemoryStore::with_transactions(vec![
        history(1, "2025-09-01", "tea", "Beverage"),
        history(2, "2025-10-20", "Tea", "Snacks"),
    ]));

    let kb = KnowledgeBase::build(&store.subscribe().borrow().transactions);
    let extractor = ExtractorClient::mock();
    let request =
        ExtractionRequest::new("tea 30 today", nov5()).with_knowledge(kb.directives());

    let candidates = extractor.extract(&request).await.unwrap();
    let reconciled = reconcile_batch(candidates, &kb, &LearnedResolver);
    assert_eq!(reconciled[0].category, "Snacks");
}
