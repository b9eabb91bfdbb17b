//! Deterministic extractor for tests and offline demos
//!
//! Tokenizes the notes with simple rules instead of calling a model: the
//! first number in a segment is the price, "yesterday"/"today" resolve
//! against the request date, and a small keyword table stands in for the
//! model's category judgment. Behavior is stable across runs so pipeline
//! tests can assert exact output.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{CandidateRecord, TransactionKind};

use super::types::ExtractionRequest;

#[derive(Debug, Clone, Default)]
pub struct MockExtractor;

impl MockExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn host(&self) -> &str {
        "mock://localhost"
    }

    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Vec<CandidateRecord>> {
        request.validate()?;

        let mut candidates = Vec::new();
        for segment in split_segments(&request.raw_text) {
            if let Some(candidate) = parse_segment(segment, request.today) {
                candidates.push(candidate);
            }
        }
        if candidates.is_empty() {
            return Err(Error::NoTransactions);
        }
        Ok(candidates)
    }
}

fn split_segments(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| c == ',' || c == '\n' || c == ';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap())
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap())
}

fn parse_segment(segment: &str, today: NaiveDate) -> Option<CandidateRecord> {
    let lower = segment.to_lowercase();

    let date = if let Some(m) = iso_date_regex().find(segment) {
        m.as_str().to_string()
    } else if lower.contains("yesterday") {
        (today - Duration::days(1)).format("%Y-%m-%d").to_string()
    } else {
        today.format("%Y-%m-%d").to_string()
    };

    // First number outside an ISO date is the price; segments without one
    // are not plausibly a transaction
    let price_match = price_regex()
        .find_iter(segment)
        .find(|m| !is_inside_iso_date(segment, m.start()))?;
    let price: f64 = price_match.as_str().parse().ok()?;

    let mut item = segment.to_string();
    if let Some(range) = iso_date_regex().find(&item).map(|m| m.range()) {
        item.replace_range(range, "");
    }
    item = item.replacen(price_match.as_str(), "", 1);
    let item = item
        .split_whitespace()
        .filter(|w| {
            let w = w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            !w.is_empty() && w != "yesterday" && w != "today" && w != "on"
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == ':' || c.is_whitespace())
        .to_string();
    if item.is_empty() {
        return None;
    }

    let kind = classify_kind(&lower);
    let category = if kind == TransactionKind::Income {
        "Income".to_string()
    } else {
        suggest_category(&lower).to_string()
    };

    Some(CandidateRecord {
        date,
        item,
        price,
        category,
        kind,
    })
}

fn is_inside_iso_date(segment: &str, offset: usize) -> bool {
    iso_date_regex()
        .find_iter(segment)
        .any(|d| d.range().contains(&offset))
}

fn classify_kind(lower: &str) -> TransactionKind {
    const INCOME_CUES: [&str; 6] =
        ["salary", "sold", "credited", "received", "income", "refund"];
    if lower.trim_start().starts_with('+')
        || INCOME_CUES.iter().any(|cue| lower.contains(cue))
    {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    }
}

fn suggest_category(lower: &str) -> &'static str {
    const TABLE: [(&str, &str); 16] = [
        ("coffee", "Food"),
        ("coffe", "Food"), // tolerate the common typo
        ("tea", "Food"),
        ("chai", "Food"),
        ("lunch", "Food"),
        ("dinner", "Food"),
        ("pizza", "Food"),
        ("grocer", "Food"),
        ("uber", "Transport"),
        ("taxi", "Transport"),
        ("bus", "Transport"),
        ("train", "Transport"),
        ("petrol", "Transport"),
        ("movie", "Entertainment"),
        ("netflix", "Entertainment"),
        ("rent", "Housing"),
    ];
    TABLE
        .iter()
        .find(|(cue, _)| lower.contains(cue))
        .map(|(_, category)| *category)
        .unwrap_or("Other")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nov5() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 5).unwrap()
    }

    #[tokio::test]
    async fn relative_dates_resolve_against_request_date() {
        let req = ExtractionRequest::new("coffee 150 yesterday, Uber 450 today", nov5());
        let records = MockExtractor::new().extract(&req).await.unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].date, "2025-11-04");
        assert_eq!(records[0].item, "coffee");
        assert_eq!(records[0].price, 150.0);
        assert_eq!(records[0].category, "Food");

        assert_eq!(records[1].date, "2025-11-05");
        assert_eq!(records[1].item, "Uber");
        assert_eq!(records[1].price, 450.0);
        assert_eq!(records[1].category, "Transport");
    }

    #[tokio::test]
    async fn surface_text_is_preserved_even_with_typos() {
        let req = ExtractionRequest::new("coffe 80", nov5());
        let records = MockExtractor::new().extract(&req).await.unwrap();
        assert_eq!(records[0].item, "coffe");
        // Misspelled beverage still categorizes as a beverage-like category
        assert_eq!(records[0].category, "Food");
    }

    #[tokio::test]
    async fn income_cues_flip_the_kind() {
        let req = ExtractionRequest::new("salary 50000, dinner 300", nov5());
        let records = MockExtractor::new().extract(&req).await.unwrap();
        assert_eq!(records[0].kind, TransactionKind::Income);
        assert_eq!(records[1].kind, TransactionKind::Expense);
    }

    #[tokio::test]
    async fn explicit_iso_dates_win_over_relative_words() {
        let req = ExtractionRequest::new("train 120 on 2025-10-31", nov5());
        let records = MockExtractor::new().extract(&req).await.unwrap();
        assert_eq!(records[0].date, "2025-10-31");
        assert_eq!(records[0].price, 120.0);
        assert_eq!(records[0].item, "train");
    }

    #[tokio::test]
    async fn non_transaction_text_yields_no_transactions() {
        let req = ExtractionRequest::new("remember to call mom", nov5());
        assert!(matches!(
            MockExtractor::new().extract(&req).await,
            Err(Error::NoTransactions)
        ));
    }
}
