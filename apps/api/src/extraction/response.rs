//! Model response parsing — pulls the JSON object out of a raw completion.
//!
//! Fail-closed: every failure becomes a `RecoveredResponse` carrying a valid
//! low-confidence fallback, so nothing past this boundary ever sees a parse error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::canonical_document;

/// Confidence assigned when no JSON could be recovered at all.
pub const UNPARSEABLE_CONFIDENCE: f64 = 0.5;
/// Confidence assigned when JSON parsed but carried no resume payload.
pub const EMPTY_PAYLOAD_CONFIDENCE: f64 = 0.7;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").expect("valid fence pattern"));

// First `{` through the last `}`.
static JSON_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid span pattern"));

/// Intermediate shape handed to the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    #[serde(default)]
    pub extracted_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_data: Option<Value>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub needs_review: Option<bool>,
    #[serde(default)]
    pub analysis: ResponseAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A parse failure that was absorbed: the reason plus the fallback to continue with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredResponse {
    pub reason: String,
    pub fallback: ParsedResponse,
}

impl ParsedResponse {
    /// Empty extraction, an empty canonical document, and a review flag.
    pub fn fallback(confidence: f64, suggestion: impl Into<String>) -> Self {
        Self {
            extracted_data: Value::Object(Map::new()),
            resume_data: Some(canonical_document()),
            confidence: Some(confidence),
            needs_review: Some(true),
            analysis: ResponseAnalysis {
                suggestions: vec![suggestion.into()],
            },
        }
    }

    /// Reads the known keys leniently; values of the wrong type are dropped.
    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let confidence = fields.get("confidence").and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|c| c.is_finite()),
            _ => None,
        });
        let needs_review = fields.get("needsReview").and_then(Value::as_bool);
        let suggestions = fields
            .get("analysis")
            .and_then(|a| a.get("suggestions"))
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            extracted_data: fields.remove("extractedData").unwrap_or(Value::Null),
            resume_data: fields.remove("resumeData").filter(|v| !v.is_null()),
            confidence,
            needs_review,
            analysis: ResponseAnalysis { suggestions },
        }
    }
}

fn recovered(confidence: f64, reason: String) -> RecoveredResponse {
    let suggestion = format!(
        "{reason} The resume was created empty; please review it and fill in the missing details."
    );
    RecoveredResponse {
        reason,
        fallback: ParsedResponse::fallback(confidence, suggestion),
    }
}

/// Extracts the response object, reporting recovered failures explicitly.
pub fn decode_model_response(raw: &str) -> Result<ParsedResponse, RecoveredResponse> {
    let cleaned = CODE_FENCE.replace_all(raw.trim(), "");

    let Some(span) = JSON_SPAN.find(&cleaned) else {
        return Err(recovered(
            UNPARSEABLE_CONFIDENCE,
            "The AI response did not contain a JSON object.".to_string(),
        ));
    };

    let fields = match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            return Err(recovered(
                UNPARSEABLE_CONFIDENCE,
                "The AI response was not a JSON object.".to_string(),
            ))
        }
        Err(e) => {
            return Err(recovered(
                UNPARSEABLE_CONFIDENCE,
                format!("The AI response contained malformed JSON ({e})."),
            ))
        }
    };

    if !fields.contains_key("resumeData") && !fields.contains_key("extractedData") {
        return Err(recovered(
            EMPTY_PAYLOAD_CONFIDENCE,
            "The AI response did not include any resume data.".to_string(),
        ));
    }

    Ok(ParsedResponse::from_fields(fields))
}
