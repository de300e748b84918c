// Resume Document schema: the canonical JSON shape shared with the renderer.
// Every AI-originated document is built from `template::canonical_document`
// and passes through `repair::repair_document` before it is stored or returned.

pub mod ids;
pub mod items;
pub mod repair;
pub mod sections;
pub mod template;

pub use repair::{repair_document, repair_document_on_read};
pub use sections::SectionKey;
pub use template::canonical_document;

use serde_json::Value;

/// True when `metadata.aiGenerated` is literally `true`.
pub fn is_ai_generated(document: &Value) -> bool {
    document
        .pointer("/metadata/aiGenerated")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
