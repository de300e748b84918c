// Extraction module — turns raw resume text into a canonical Resume Document.
//
// Flow: detect_text_format → build_extraction_prompt → (model call) →
// decode_model_response → normalize_response. The model call itself lives in
// `build::orchestrator`; everything here is pure.

pub mod dates;
pub mod format;
pub mod normalizer;
pub mod profiles;
pub mod prompts;
pub mod raw;
pub mod response;
pub mod skills;

pub use format::detect_text_format;
pub use normalizer::normalize_response;
pub use prompts::build_extraction_prompt;
pub use response::{decode_model_response, ParsedResponse, RecoveredResponse};

use serde::{Deserialize, Serialize};

use crate::sources::SourceType;

/// Per-request knobs for one build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    #[serde(default)]
    pub source_type: SourceType,
    /// Overrides the configured model for this build.
    #[serde(default)]
    pub model: Option<String>,
    /// Written to `metadata.template` when present.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}
