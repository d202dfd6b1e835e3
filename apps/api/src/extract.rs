//! File Text Extractor: turns an uploaded JD / CV file into plain text.
//!
//! Dispatch is by file extension:
//! - `.txt`  → UTF-8, invalid sequences replaced
//! - `.pdf`  → `pdf-extract` (parser panics are caught and reported)
//! - `.docx` → `<w:t>` runs from `word/document.xml`, one line per paragraph
//! - other   → strict UTF-8, otherwise unsupported
//!
//! Extraction is CPU-bound; handlers call it inside `spawn_blocking`.

use std::io::{Cursor, Read};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from the file")]
    Empty,
}

/// Extracts plain text from `bytes`, choosing the decoder from `filename`.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "txt" => String::from_utf8_lossy(bytes).into_owned(),
        "pdf" => extract_pdf(bytes)?,
        "docx" => extract_docx(bytes)?,
        _ => String::from_utf8(bytes.to_vec()).map_err(|_| {
            ExtractError::UnsupportedType(if extension.is_empty() {
                filename.to_string()
            } else {
                format!(".{extension}")
            })
        })?,
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => {
            warn!("PDF parser panicked on a {} byte upload", bytes.len());
            Err(ExtractError::Pdf("malformed document".to_string()))
        }
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    docx_xml_to_text(&xml)
}

/// Collects `<w:t>` text runs; paragraph ends and `<w:br/>` become newlines, `<w:tab/>` a tab.
fn docx_xml_to_text(xml: &str) -> Result<String, ExtractError> {
    let pattern = Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:br\s*/>|<w:tab\s*/>")
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut text = String::new();
    for caps in pattern.captures_iter(xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_xml_entities(run.as_str())),
            None if caps[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    Ok(text)
}

fn decode_xml_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
