//! CLI command tests against temp databases

use std::path::PathBuf;

use paisa_core::LedgerStore;

use crate::commands;

fn temp_db(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("ledger.db")
}

#[test]
fn explicit_db_path_is_used_verbatim() {
    let path = PathBuf::from("/tmp/somewhere/ledger.db");
    let resolved = commands::resolve_db_path(Some(&path)).unwrap();
    assert_eq!(resolved, path);
}

#[tokio::test]
async fn add_then_list_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    commands::cmd_add(&db, "coffee", 150.0, "Food", Some("2025-11-04"), false)
        .await
        .unwrap();
    commands::cmd_add(&db, "salary", 50000.0, "Income", Some("2025-11-01"), true)
        .await
        .unwrap();

    let store = commands::open_store(&db).unwrap();
    let snapshot = store.subscribe().borrow().clone();
    assert_eq!(snapshot.transactions.len(), 2);
    // Newest first
    assert_eq!(snapshot.transactions[0].item, "coffee");

    // List must not error with a month filter
    commands::cmd_list(&db, 20, Some("2025-11")).await.unwrap();
}

#[tokio::test]
async fn analyze_without_any_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    let result = commands::cmd_analyze(&db, None, &[], &[], None, true).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn analyze_sends_images_to_the_configured_server() {
    let server = paisa_core::test_utils::StubModelServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    let img = dir.path().join("receipt.png");
    std::fs::write(&img, b"fake image bytes").unwrap();

    // Image-only input, proxy picked via --server rather than the environment
    commands::cmd_analyze(&db, None, &[], &[img], Some(&server.url()), false)
        .await
        .unwrap();

    let store = commands::open_store(&db).unwrap();
    let snapshot = store.subscribe().borrow().clone();
    assert_eq!(snapshot.transactions.len(), 1);
    assert_eq!(snapshot.transactions[0].item, "coffee");
}

#[tokio::test]
async fn analyze_merges_note_files_with_inline_text() {
    let server = paisa_core::test_utils::StubModelServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "coffee 150 yesterday").unwrap();

    commands::cmd_analyze(
        &db,
        Some("uber 450 today"),
        &[notes],
        &[],
        Some(&server.url()),
        true,
    )
    .await
    .unwrap();

    // Dry run: nothing persisted
    let store = commands::open_store(&db).unwrap();
    assert!(store.subscribe().borrow().transactions.is_empty());
}

#[tokio::test]
async fn add_rejects_malformed_dates() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    let result = commands::cmd_add(&db, "coffee", 150.0, "Food", Some("04-11-2025"), false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn edit_requires_at_least_one_field() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    commands::cmd_add(&db, "coffee", 150.0, "Food", Some("2025-11-04"), false)
        .await
        .unwrap();

    let result = commands::cmd_edit(&db, 1, None, None, None, None).await;
    assert!(result.is_err());

    commands::cmd_edit(&db, 1, None, Some("Beverage".into()), None, None)
        .await
        .unwrap();
    let store = commands::open_store(&db).unwrap();
    assert_eq!(
        store.subscribe().borrow().transactions[0].category,
        "Beverage"
    );
}

#[tokio::test]
async fn delete_unknown_id_reports_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    commands::open_store(&db).unwrap();
    assert!(commands::cmd_delete(&db, 99).await.is_err());
}

#[tokio::test]
async fn budget_set_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);

    commands::cmd_budget(&db, Some(15000.0)).await.unwrap();
    let store = commands::open_store(&db).unwrap();
    assert_eq!(*store.subscribe_budget().borrow(), 15000.0);

    // Show path must not error
    commands::cmd_budget(&db, None).await.unwrap();
}

#[tokio::test]
async fn export_writes_a_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir);
    commands::cmd_add(&db, "coffee", 150.0, "Food", Some("2025-11-04"), false)
        .await
        .unwrap();

    let out = dir.path().join("ledger.csv");
    commands::cmd_export(&db, Some(&out)).await.unwrap();

    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("Date,Item,Category,Type,Amount"));
    assert!(csv.contains("coffee"));
}
