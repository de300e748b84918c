use serde::{Deserialize, Serialize};

/// Coarse shape of extracted source text. Only used to steer the extraction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Markdown,
    Structured,
    Plain,
}

const MARKDOWN_MARKERS: &[&str] = &["# ", "## ", "* ", "- "];
const SECTION_MARKERS: &[&str] = &["EXPERIENCE", "EDUCATION", "SKILLS", "WORK"];

/// First match wins: markdown markers, then upper-case section headings, else plain.
pub fn detect_text_format(text: &str) -> TextFormat {
    if MARKDOWN_MARKERS.iter().any(|m| text.contains(m)) {
        TextFormat::Markdown
    } else if SECTION_MARKERS.iter().any(|m| text.contains(m)) {
        TextFormat::Structured
    } else {
        TextFormat::Plain
    }
}
