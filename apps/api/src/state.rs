use std::sync::Arc;

use crate::build::BuildOrchestrator;
use crate::resumes::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BuildOrchestrator>,
    /// Same store the orchestrator persists into; serves the read/update path.
    pub documents: Arc<dyn DocumentStore>,
}
