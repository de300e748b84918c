//! Legacy Word (.doc) text scraping.
//!
//! The binary format keeps body text either as 8-bit runs or as UTF-16LE runs.
//! Both encodings are scanned for printable runs and the richer result wins.
//! Formatting tables produce short noisy runs, which the minimum run length
//! and the letter check filter out.

use super::{ExtractedText, ExtractionError};

pub const DOC_CONFIDENCE: f64 = 0.6;
const MIN_RUN_CHARS: usize = 4;

pub fn extract_doc_text(bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
    let narrow = join_runs(narrow_runs(bytes));
    let wide = join_runs(wide_runs(bytes));
    let text = if wide.len() > narrow.len() { wide } else { narrow };

    if text.is_empty() {
        return Err(ExtractionError::Doc("no readable text found".to_string()));
    }
    Ok(ExtractedText::new(text, DOC_CONFIDENCE))
}

fn is_text_byte(byte: u8) -> bool {
    byte.is_ascii_graphic() || matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

fn narrow_runs(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| !is_text_byte(*b))
        .map(|run| String::from_utf8_lossy(run).into_owned())
        .collect()
}

// UTF-16LE: printable ASCII in the low byte, zero in the high byte.
fn wide_runs(bytes: &[u8]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for pair in bytes.chunks_exact(2) {
        if pair[1] == 0 && is_text_byte(pair[0]) {
            current.push(pair[0] as char);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn join_runs(runs: Vec<String>) -> String {
    runs.iter()
        .flat_map(|run| run.split(['\r', '\n']))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| line.chars().count() >= MIN_RUN_CHARS)
        .filter(|line| line.chars().any(|c| c.is_ascii_alphabetic()))
        .collect::<Vec<_>>()
        .join("\n")
}
