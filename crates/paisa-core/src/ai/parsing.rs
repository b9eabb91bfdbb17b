//! Parsing of model output into candidate records
//!
//! Even with a response schema, model output arrives as text and may be
//! wrapped in code fences or an `{ "expenses": [...] }` envelope. These
//! helpers locate the JSON payload, validate each record's required fields,
//! and classify the failure modes distinctly.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{CandidateRecord, TransactionKind};

/// Parse raw model text into candidate records
///
/// Accepts a bare JSON array or an `{ "expenses": [...] }` envelope,
/// optionally inside Markdown code fences. An empty result set is the
/// distinct no-transactions condition, not a malformed-output one.
pub fn parse_candidates(raw: &str) -> Result<Vec<CandidateRecord>> {
    let payload = locate_json(raw)?;
    let array = match &payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get("expenses") {
            Some(Value::Array(items)) => items.clone(),
            _ => {
                return Err(Error::MalformedOutput(
                    "expected an array or an {\"expenses\": [...]} object".into(),
                ))
            }
        },
        _ => {
            return Err(Error::MalformedOutput(
                "expected a JSON array of records".into(),
            ))
        }
    };

    let mut candidates = Vec::with_capacity(array.len());
    for (index, entry) in array.iter().enumerate() {
        candidates.push(parse_record(entry).map_err(|e| {
            Error::MalformedOutput(format!("record {}: {}", index, e))
        })?);
    }

    if candidates.is_empty() {
        return Err(Error::NoTransactions);
    }
    Ok(candidates)
}

fn parse_record(entry: &Value) -> std::result::Result<CandidateRecord, String> {
    let obj = entry.as_object().ok_or("not an object")?;

    let date = required_string(obj, "date")?;
    let item = required_string(obj, "item")?;
    let category = required_string(obj, "category")?;
    let price = match obj.get("price") {
        Some(Value::Number(n)) => n.as_f64().ok_or("price is not a finite number")?,
        // Some model variants quote numbers
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("price {:?} is not numeric", s))?,
        _ => return Err("missing field price".into()),
    };
    if price < 0.0 || !price.is_finite() {
        return Err(format!("price {} is negative or not finite", price));
    }

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<TransactionKind>().ok())
        .unwrap_or_default();

    Ok(CandidateRecord {
        date,
        item,
        price,
        category,
        kind,
    })
}

fn required_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<String, String> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(format!("field {} is empty", field)),
        _ => Err(format!("missing field {}", field)),
    }
}

fn locate_json(raw: &str) -> Result<Value> {
    let text = strip_code_fences(raw.trim());

    // First balanced parse wins; fall back to slicing out the outermost
    // bracket pair for responses with surrounding prose.
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }
    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }
    let preview: String = text.chars().take(200).collect();
    Err(Error::MalformedOutput(format!(
        "no JSON found in model output: {}",
        preview
    )))
}

fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line, then the closing fence
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.rsplit_once("```").map(|(body, _)| body).unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_parses() {
        let raw = r#"[{"date":"2025-11-04","item":"coffee","price":150,"category":"Food"}]"#;
        let records = parse_candidates(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item, "coffee");
        assert_eq!(records[0].kind, TransactionKind::Expense);
    }

    #[test]
    fn expenses_envelope_parses() {
        let raw = r#"{"expenses":[{"date":"2025-11-05","item":"Uber","price":450,"category":"Transport","type":"expense"}]}"#;
        let records = parse_candidates(raw).unwrap();
        assert_eq!(records[0].category, "Transport");
    }

    #[test]
    fn code_fences_are_stripped() {
        let raw = "```json\n[{\"date\":\"2025-11-04\",\"item\":\"tea\",\"price\":20,\"category\":\"Food\"}]\n```";
        let records = parse_candidates(raw).unwrap();
        assert_eq!(records[0].item, "tea");
    }

    #[test]
    fn quoted_price_is_accepted() {
        let raw = r#"[{"date":"2025-11-04","item":"tea","price":"20.5","category":"Food"}]"#;
        assert_eq!(parse_candidates(raw).unwrap()[0].price, 20.5);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let raw = r#"[{"date":"2025-11-04","price":150,"category":"Food"}]"#;
        let err = parse_candidates(raw).unwrap_err();
        assert!(matches!(err, Error::MalformedOutput(_)), "{}", err);
    }

    #[test]
    fn negative_price_is_malformed() {
        let raw = r#"[{"date":"2025-11-04","item":"x","price":-5,"category":"Food"}]"#;
        assert!(matches!(
            parse_candidates(raw),
            Err(Error::MalformedOutput(_))
        ));
    }

    #[test]
    fn empty_array_is_no_transactions() {
        assert!(matches!(parse_candidates("[]"), Err(Error::NoTransactions)));
        assert!(matches!(
            parse_candidates(r#"{"expenses":[]}"#),
            Err(Error::NoTransactions)
        ));
    }

    #[test]
    fn prose_without_json_is_malformed() {
        assert!(matches!(
            parse_candidates("I could not find any expenses."),
            Err(Error::MalformedOutput(_))
        ));
    }

    #[test]
    fn income_type_roundtrips() {
        let raw = r#"[{"date":"2025-11-01","item":"salary","price":50000,"category":"Income","type":"income"}]"#;
        assert_eq!(parse_candidates(raw).unwrap()[0].kind, TransactionKind::Income);
    }
}
