// Sources module: turns an uploaded resume (pasted text, PDF, DOC, LinkedIn
// export) into plain text plus an extraction confidence.
//
// The orchestrator only sees the `TextExtractor` trait; `DefaultExtractor`
// dispatches to the per-format modules below.

pub mod doc;
pub mod linkedin;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Confidence for text the user pasted directly.
pub const PLAIN_TEXT_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Text,
    Pdf,
    Doc,
    LinkedIn,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Text => "text",
            SourceType::Pdf => "pdf",
            SourceType::Doc => "doc",
            SourceType::LinkedIn => "linkedin",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" | "plain" => Ok(SourceType::Text),
            "pdf" => Ok(SourceType::Pdf),
            "doc" | "docx" | "word" => Ok(SourceType::Doc),
            "linkedin" => Ok(SourceType::LinkedIn),
            other => Err(ExtractionError::UnsupportedSource(other.to_string())),
        }
    }
}

/// The raw upload for one build.
#[derive(Debug, Clone)]
pub enum SourceData {
    Text(String),
    Pdf(Bytes),
    Doc(Bytes),
    LinkedIn(Value),
}

impl SourceData {
    pub fn source_type(&self) -> SourceType {
        match self {
            SourceData::Text(_) => SourceType::Text,
            SourceData::Pdf(_) => SourceType::Pdf,
            SourceData::Doc(_) => SourceType::Doc,
            SourceData::LinkedIn(_) => SourceType::LinkedIn,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    /// 0.0–1.0; how faithfully `text` reflects the source document.
    pub confidence: f64,
}

impl ExtractedText {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOC extraction failed: {0}")]
    Doc(String),

    #[error("LinkedIn export could not be read: {0}")]
    LinkedIn(String),

    #[error("Unsupported source type: {0}")]
    UnsupportedSource(String),

    #[error("No text could be extracted")]
    NoText,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, source: &SourceData) -> Result<ExtractedText, ExtractionError>;
}

/// Routes each source type to its extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

#[async_trait]
impl TextExtractor for DefaultExtractor {
    async fn extract(&self, source: &SourceData) -> Result<ExtractedText, ExtractionError> {
        match source {
            SourceData::Text(text) => Ok(ExtractedText::new(text.trim(), PLAIN_TEXT_CONFIDENCE)),
            SourceData::Pdf(bytes) => pdf::extract_pdf_text(bytes.clone()).await,
            SourceData::Doc(bytes) => doc::extract_doc_text(bytes),
            SourceData::LinkedIn(export) => linkedin::flatten_export(export),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_type_parse_and_serde() {
        assert_eq!("PDF".parse::<SourceType>().unwrap(), SourceType::Pdf);
        assert_eq!("docx".parse::<SourceType>().unwrap(), SourceType::Doc);
        assert_eq!("linkedin".parse::<SourceType>().unwrap(), SourceType::LinkedIn);
        assert!("rtf".parse::<SourceType>().is_err());
        assert_eq!(serde_json::to_value(SourceType::LinkedIn).unwrap(), json!("linkedin"));
        assert_eq!(SourceType::default(), SourceType::Text);
    }

    #[tokio::test]
    async fn test_plain_text_passthrough() {
        let extracted = DefaultExtractor
            .extract(&SourceData::Text("  Jane Doe\nEngineer  ".into()))
            .await
            .unwrap();
        assert_eq!(extracted.text, "Jane Doe\nEngineer");
        assert_eq!(extracted.confidence, PLAIN_TEXT_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_dispatches_linkedin() {
        let extracted = DefaultExtractor
            .extract(&SourceData::LinkedIn(json!({"firstName": "Jane", "lastName": "Doe"})))
            .await
            .unwrap();
        assert!(extracted.text.starts_with("Jane Doe"));
        assert_eq!(extracted.confidence, linkedin::LINKEDIN_CONFIDENCE);
    }

    #[test]
    fn test_source_data_type() {
        assert_eq!(SourceData::Pdf(Bytes::new()).source_type(), SourceType::Pdf);
        assert_eq!(SourceData::LinkedIn(json!({})).source_type(), SourceType::LinkedIn);
    }
}
