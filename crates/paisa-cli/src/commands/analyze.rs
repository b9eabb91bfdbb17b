//! The analyze command: notes in, categorized ledger entries out

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use paisa_core::store::insert_batch;
use paisa_core::{
    files, reconcile_batch, ExtractionRequest, Extractor, ExtractorClient, ImageAttachment,
    KnowledgeBase, LearnedResolver, LedgerStore, NewTransaction,
};

use super::core::open_store;

pub async fn cmd_analyze(
    db_path: &Path,
    text: Option<&str>,
    file_paths: &[PathBuf],
    image_paths: &[PathBuf],
    server: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let notes = gather_notes(text, file_paths)?;
    let attachments = load_images(image_paths)?;
    if notes.trim().is_empty() && attachments.is_empty() {
        anyhow::bail!("Nothing to analyze; pass notes as an argument, --file, or --image");
    }

    // --server wins over the environment
    let extractor = match server {
        Some(url) => ExtractorClient::gateway(url),
        None => ExtractorClient::from_env().context(
            "No extraction backend configured. Pass --server, set PAISA_GATEWAY_URL \
             to your proxy, or PAISA_EXTRACTOR=mock for the offline extractor",
        )?,
    };

    let store = open_store(db_path)?;
    let kb = KnowledgeBase::build(&store.subscribe().borrow().transactions);
    if !kb.is_empty() {
        println!("🧠 Using {} learned categor{}", kb.len(), plural_y(kb.len()));
    }

    let mut request = ExtractionRequest::new(notes, chrono::Local::now().date_naive())
        .with_knowledge(kb.directives());
    request.images = attachments;
    let candidates = extractor.extract(&request).await?;
    let reconciled = reconcile_batch(candidates, &kb, &LearnedResolver);

    println!("Found {} transaction(s):", reconciled.len());
    for candidate in &reconciled {
        println!(
            "  {}  {:<24}  {:<14}  {:>10.2}  {}",
            candidate.date,
            candidate.item,
            candidate.category,
            candidate.price,
            candidate.kind.as_str()
        );
    }

    if dry_run {
        println!("(dry run, nothing saved)");
        return Ok(());
    }

    let records: Vec<NewTransaction> = reconciled.into_iter().map(Into::into).collect();
    let report = insert_batch(&store, records).await;
    println!("✅ Saved {} transaction(s)", report.inserted.len());
    for (record, reason) in &report.failures {
        println!("⚠️  Could not save {:?}: {}", record.item, reason);
    }
    Ok(())
}

/// Resolve the notes from the text argument and any note files
///
/// May legitimately be empty when the request carries image attachments.
fn gather_notes(text: Option<&str>, file_paths: &[PathBuf]) -> Result<String> {
    let mut notes = text.unwrap_or_default().to_string();
    for path in file_paths {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mime = mime_from_extension(path);
        let extracted = files::extract_text(mime, &bytes)?;
        if !notes.is_empty() {
            notes.push('\n');
        }
        notes.push_str(&extracted);
    }
    Ok(notes)
}

/// Read and base64-encode receipt images
fn load_images(image_paths: &[PathBuf]) -> Result<Vec<ImageAttachment>> {
    image_paths
        .iter()
        .map(|path| {
            let mime = image_mime_from_extension(path).with_context(|| {
                format!(
                    "{} is not a supported image; use .png, .jpg, or .webp",
                    path.display()
                )
            })?;
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(ImageAttachment::from_bytes(mime, &bytes))
        })
        .collect()
}

fn mime_from_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("txt") | Some("md") => files::MIME_TEXT,
        Some("pdf") => files::MIME_PDF,
        Some("docx") => files::MIME_DOCX,
        // Let the extraction boundary produce the unsupported-type error
        _ => "application/octet-stream",
    }
}

fn image_mime_from_extension(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        _ => None,
    }
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
