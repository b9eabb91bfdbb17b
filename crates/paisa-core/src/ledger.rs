//! Ledger aggregation
//!
//! Pure functions over the full transaction set. There is no incremental
//! update path: every change recomputes from scratch, which is the
//! simplest-correct choice for personal-log dataset sizes and makes the
//! aggregates trivially idempotent.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{Transaction, TransactionKind};

/// How many daily breakdown rows to keep
const DAILY_BREAKDOWN_LIMIT: usize = 10;

/// Derived view of the ledger for the summary screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSummary {
    /// Total expense in the current calendar month
    pub month_expense: f64,
    /// Total income in the current calendar month
    pub month_income: f64,
    /// income - expense for the current calendar month
    pub net_balance: f64,
    /// The configured monthly budget (0 when unset)
    pub budget: f64,
    /// Clamped consumption percentage, None when no budget is set
    pub budget_used_pct: Option<f64>,
    /// Expense totals per `YYYY-MM`, newest month first
    pub monthly: Vec<(String, f64)>,
    /// Expense totals per `YYYY-MM-DD`, newest day first, capped at 10
    pub daily: Vec<(String, f64)>,
    /// Expense totals per category, largest first
    pub categories: Vec<(String, f64)>,
}

/// One bucket of the income/expense trend
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    /// `YYYY-MM-DD` when a month filter is active, `YYYY-MM` otherwise
    pub bucket: String,
    pub expense: f64,
    pub income: f64,
}

/// Recompute the full summary from the current transaction set
///
/// Records whose date fails to parse are excluded from every date-keyed
/// aggregate but still count toward category totals.
pub fn summarize(transactions: &[Transaction], budget: f64, today: NaiveDate) -> LedgerSummary {
    let current_month = today.format("%Y-%m").to_string();

    let mut month_expense = 0.0;
    let mut month_income = 0.0;
    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    let mut daily: BTreeMap<String, f64> = BTreeMap::new();
    let mut categories: BTreeMap<String, f64> = BTreeMap::new();

    for tx in transactions {
        if tx.kind == TransactionKind::Expense {
            let cat = if tx.category.trim().is_empty() {
                "Other".to_string()
            } else {
                tx.category.clone()
            };
            *categories.entry(cat).or_insert(0.0) += tx.price;
        }

        let Some(date) = tx.parsed_date() else {
            continue;
        };
        let month = date.format("%Y-%m").to_string();
        let day = date.format("%Y-%m-%d").to_string();

        match tx.kind {
            TransactionKind::Expense => {
                *monthly.entry(month.clone()).or_insert(0.0) += tx.price;
                *daily.entry(day).or_insert(0.0) += tx.price;
                if month == current_month {
                    month_expense += tx.price;
                }
            }
            TransactionKind::Income => {
                if month == current_month {
                    month_income += tx.price;
                }
            }
        }
    }

    let budget_used_pct = if budget > 0.0 {
        Some((month_expense / budget * 100.0).clamp(0.0, 100.0))
    } else {
        None
    };

    let mut monthly: Vec<(String, f64)> = monthly.into_iter().collect();
    monthly.sort_by(|a, b| b.0.cmp(&a.0));

    let mut daily: Vec<(String, f64)> = daily.into_iter().collect();
    daily.sort_by(|a, b| b.0.cmp(&a.0));
    daily.truncate(DAILY_BREAKDOWN_LIMIT);

    let mut categories: Vec<(String, f64)> = categories.into_iter().collect();
    categories.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    LedgerSummary {
        month_expense,
        month_income,
        net_balance: month_income - month_expense,
        budget,
        budget_used_pct,
        monthly,
        daily,
        categories,
    }
}

/// Date-bucketed income/expense totals for trend charting
///
/// With a `YYYY-MM` filter the buckets are days of that month; without one
/// they are months across the whole history. Ascending by bucket.
pub fn trend(transactions: &[Transaction], month_filter: Option<&str>) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for tx in transactions {
        let Some(date) = tx.parsed_date() else {
            continue;
        };
        let bucket = match month_filter {
            Some(month) => {
                let day = date.format("%Y-%m-%d").to_string();
                if !day.starts_with(month) {
                    continue;
                }
                day
            }
            None => date.format("%Y-%m").to_string(),
        };
        let entry = buckets.entry(bucket).or_insert((0.0, 0.0));
        match tx.kind {
            TransactionKind::Expense => entry.0 += tx.price,
            TransactionKind::Income => entry.1 += tx.price,
        }
    }

    buckets
        .into_iter()
        .map(|(bucket, (expense, income))| TrendPoint {
            bucket,
            expense,
            income,
        })
        .collect()
}
