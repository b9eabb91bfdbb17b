//! CSV export of the ledger
//!
//! One row per transaction, newest first (snapshot order), with a fixed
//! header the spreadsheet import on the other end expects.

use crate::error::{Error, Result};
use crate::models::Transaction;

const HEADER: [&str; 5] = ["Date", "Item", "Category", "Type", "Amount"];

/// Render transactions as CSV text
///
/// Exporting an empty ledger is a user error, not an empty file.
pub fn to_csv(transactions: &[Transaction]) -> Result<String> {
    if transactions.is_empty() {
        return Err(Error::InvalidInput(
            "There are no transactions to export yet".into(),
        ));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for tx in transactions {
        writer.write_record([
            tx.date.as_str(),
            tx.item.as_str(),
            tx.category.as_str(),
            tx.kind.as_str(),
            &format!("{:.2}", tx.price),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::InvalidData(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV encoding error: {}", e)))
}
