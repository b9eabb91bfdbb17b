//! Text extraction from uploaded files
//!
//! Three MIME types are accepted: plain text passes through, PDF text comes
//! out of the content streams via lopdf, and DOCX is unzipped down to
//! `word/document.xml` with the markup stripped. Anything else is rejected
//! before any network call happens.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extract plain text from an uploaded file
pub fn extract_text(mime_type: &str, bytes: &[u8]) -> Result<String> {
    match mime_type {
        MIME_TEXT => Ok(String::from_utf8_lossy(bytes).into_owned()),
        MIME_PDF => extract_pdf(bytes),
        MIME_DOCX => extract_docx(bytes),
        other => Err(Error::UnsupportedFile(other.to_string())),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(pages = pages.len(), "Extracting PDF text");
    let text = doc.extract_text(&pages)?;
    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;
    Ok(strip_markup(&xml))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn strip_markup(xml: &str) -> String {
    // Paragraph ends become newlines so notes keep their line structure
    let with_breaks = xml.replace("</w:p>", "</w:p>\n");
    let text = tag_regex().replace_all(&with_breaks, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .trim()
        .to_string()
}
