//! Summary and watch commands

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use paisa_core::{summarize, trend, LedgerStore, LedgerSummary, Session};

use super::core::open_store;

pub async fn cmd_summary(db_path: &Path, month: Option<&str>) -> Result<()> {
    let store = open_store(db_path)?;
    let snapshot = store.subscribe().borrow().clone();
    let budget = *store.subscribe_budget().borrow();

    let today = chrono::Local::now().date_naive();
    let summary = summarize(&snapshot.transactions, budget, today);
    print_summary(&summary, &today.format("%Y-%m").to_string());

    let points = trend(&snapshot.transactions, month);
    if !points.is_empty() {
        match month {
            Some(m) => println!("\nDaily trend for {}:", m),
            None => println!("\nMonthly trend:"),
        }
        for point in points {
            println!(
                "  {:<10}  expense {:>10.2}  income {:>10.2}",
                point.bucket, point.expense, point.income
            );
        }
    }
    Ok(())
}

/// Reprint the summary on every ledger change until Ctrl-C
pub async fn cmd_watch(db_path: &Path) -> Result<()> {
    let store = Arc::new(open_store(db_path)?);
    let session = Session::attach(store);
    let mut summaries = session.summary();

    let month = chrono::Local::now().date_naive().format("%Y-%m").to_string();
    print_summary(&session.current_summary(), &month);
    println!("\nWatching for changes (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = summaries.changed() => {
                if changed.is_err() {
                    break;
                }
                println!();
                print_summary(&summaries.borrow().clone(), &month);
            }
        }
    }
    session.close();
    Ok(())
}

fn print_summary(summary: &LedgerSummary, month: &str) {
    println!("📒 {}: expense {:.2}, income {:.2}, net {:+.2}",
        month, summary.month_expense, summary.month_income, summary.net_balance);

    if let Some(pct) = summary.budget_used_pct {
        println!(
            "💰 Budget: {:.2} of {:.2} used ({:.0}%) {}",
            summary.month_expense,
            summary.budget,
            pct,
            bar(pct)
        );
    }

    if !summary.categories.is_empty() {
        println!("Top categories:");
        for (category, total) in summary.categories.iter().take(5) {
            println!("  {:<14} {:>10.2}", category, total);
        }
    }

    if !summary.daily.is_empty() {
        println!("Recent days:");
        for (day, total) in summary.daily.iter().take(5) {
            println!("  {:<10} {:>10.2}", day, total);
        }
    }
}

fn bar(pct: f64) -> String {
    let filled = ((pct / 10.0).round() as usize).min(10);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_and_clamps() {
        assert_eq!(bar(0.0), "[----------]");
        assert_eq!(bar(50.0), "[#####-----]");
        assert_eq!(bar(100.0), "[##########]");
    }
}
