//! CSV export command

use std::path::Path;

use anyhow::{Context, Result};

use paisa_core::{export, LedgerStore};

use super::core::open_store;

pub async fn cmd_export(db_path: &Path, output: Option<&Path>) -> Result<()> {
    let store = open_store(db_path)?;
    let snapshot = store.subscribe().borrow().clone();
    let csv = export::to_csv(&snapshot.transactions)?;

    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "✅ Exported {} transaction(s) to {}",
                snapshot.transactions.len(),
                path.display()
            );
        }
        None => print!("{}", csv),
    }
    Ok(())
}
