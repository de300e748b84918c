use thiserror::Error;

use crate::extraction::{ParsedResponse, RecoveredResponse};
use crate::llm_client::LlmError;
use crate::sources::ExtractionError;

/// Errors that end a build.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// The last attempt's error once retries are exhausted.
    #[error("{0}")]
    Model(#[from] LlmError),

    #[error("Failed to save resume: {0:#}")]
    Storage(anyhow::Error),
}

/// Outcome of a failing pipeline stage: either absorbed with a fallback to
/// continue from, or fatal for the request.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{reason}")]
    Recoverable {
        reason: String,
        fallback: Box<ParsedResponse>,
    },

    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl From<RecoveredResponse> for BuildError {
    fn from(recovered: RecoveredResponse) -> Self {
        BuildError::Recoverable {
            reason: recovered.reason,
            fallback: Box::new(recovered.fallback),
        }
    }
}

impl From<ExtractionError> for BuildError {
    fn from(e: ExtractionError) -> Self {
        BuildError::Fatal(FatalError::Extraction(e))
    }
}

impl From<LlmError> for BuildError {
    fn from(e: LlmError) -> Self {
        BuildError::Fatal(FatalError::Model(e))
    }
}
