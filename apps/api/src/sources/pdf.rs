//! PDF text extraction backed by `pdf-extract`.
//!
//! `pdf-extract` is synchronous and CPU-bound, so it runs on the blocking pool.
//! A panic inside the library surfaces as a join error and is reported like
//! any other extraction failure.

use bytes::Bytes;

use super::{ExtractedText, ExtractionError};

pub const PDF_CONFIDENCE: f64 = 0.9;
/// Confidence of the raw-bytes fallback used when the PDF library gives up.
pub const LOSSY_CONFIDENCE: f64 = 0.3;

pub async fn extract_pdf_text(bytes: Bytes) -> Result<ExtractedText, ExtractionError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractionError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    Ok(ExtractedText::new(tidy_pages(&text), PDF_CONFIDENCE))
}

/// Decodes the bytes as UTF-8, dropping replacement and control characters.
pub fn decode_lossy(bytes: &[u8]) -> ExtractedText {
    let text: String = String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    ExtractedText::new(text.trim(), LOSSY_CONFIDENCE)
}

// Form feeds separate pages; runs of blank lines are collapsed to one.
fn tidy_pages(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.replace('\x0C', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
