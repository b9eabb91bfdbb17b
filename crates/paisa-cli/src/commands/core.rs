//! Shared store helpers and direct ledger commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use paisa_core::{
    LedgerStore, NewTransaction, SqliteStore, Transaction, TransactionKind, TransactionPatch,
};

/// Resolve the ledger database path
///
/// `--db` wins; otherwise the platform data directory gets a `paisa/`
/// subdirectory created on first use.
pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let base = dirs::data_dir().context("Could not determine the platform data directory")?;
    let dir = base.join("paisa");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir.join("ledger.db"))
}

pub fn open_store(db_path: &Path) -> Result<SqliteStore> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    SqliteStore::open(path_str)
        .with_context(|| format!("Failed to open ledger at {}", db_path.display()))
}

pub async fn cmd_add(
    db_path: &Path,
    item: &str,
    price: f64,
    category: &str,
    date: Option<&str>,
    income: bool,
) -> Result<()> {
    let date = match date {
        Some(d) => {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .with_context(|| format!("{} is not a valid YYYY-MM-DD date", d))?;
            d.to_string()
        }
        None => chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
    };

    let store = open_store(db_path)?;
    let tx = store
        .insert(NewTransaction {
            date,
            item: item.to_string(),
            category: category.to_string(),
            price,
            kind: if income {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            },
        })
        .await?;

    println!(
        "✅ Saved #{}: {} {} {:.2} ({})",
        tx.id, tx.date, tx.item, tx.price, tx.category
    );
    Ok(())
}

pub async fn cmd_list(db_path: &Path, limit: usize, month: Option<&str>) -> Result<()> {
    let store = open_store(db_path)?;
    let snapshot = store.subscribe().borrow().clone();

    let rows: Vec<&Transaction> = snapshot
        .transactions
        .iter()
        .filter(|t| month.map_or(true, |m| t.date.starts_with(m)))
        .take(limit)
        .collect();

    if rows.is_empty() {
        println!("No transactions yet. Try: paisa analyze \"coffee 150 yesterday\"");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10}  {:<24}  {:<14}  {:<7}  {:>10}",
        "ID", "Date", "Item", "Category", "Type", "Amount"
    );
    for tx in rows {
        println!(
            "{:>5}  {:<10}  {:<24}  {:<14}  {:<7}  {:>10.2}",
            tx.id,
            tx.date,
            truncate(&tx.item, 24),
            truncate(&tx.category, 14),
            tx.kind.as_str(),
            tx.price
        );
    }
    Ok(())
}

pub async fn cmd_edit(
    db_path: &Path,
    id: i64,
    item: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    date: Option<String>,
) -> Result<()> {
    if let Some(ref d) = date {
        NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .with_context(|| format!("{} is not a valid YYYY-MM-DD date", d))?;
    }
    if item.is_none() && category.is_none() && price.is_none() && date.is_none() {
        anyhow::bail!("Nothing to change; pass at least one of --item/--category/--price/--date");
    }

    let store = open_store(db_path)?;
    let updated = store
        .replace(
            id,
            TransactionPatch {
                date,
                item,
                category,
                price,
                kind: None,
            },
        )
        .await?;

    println!(
        "✅ Updated #{}: {} {} {:.2} ({})",
        updated.id, updated.date, updated.item, updated.price, updated.category
    );
    Ok(())
}

pub async fn cmd_delete(db_path: &Path, id: i64) -> Result<()> {
    let store = open_store(db_path)?;
    store.delete(id).await?;
    println!("🗑️  Deleted #{}", id);
    Ok(())
}

pub async fn cmd_budget(db_path: &Path, amount: Option<f64>) -> Result<()> {
    let store = open_store(db_path)?;
    match amount {
        Some(amount) => {
            store.save_budget(amount).await?;
            println!("✅ Monthly budget set to {:.2}", amount);
        }
        None => {
            let budget = *store.subscribe_budget().borrow();
            if budget > 0.0 {
                println!("Monthly budget: {:.2}", budget);
            } else {
                println!("No budget set. Try: paisa budget 15000");
            }
        }
    }
    Ok(())
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
