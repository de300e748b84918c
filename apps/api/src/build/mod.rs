// Resume build pipeline: source text in, normalized and stored Resume Document out.
// `orchestrator` drives the stages; `jobs` records one telemetry row per build.

pub mod cost;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod orchestrator;

pub use error::{BuildError, FatalError};
pub use orchestrator::BuildOrchestrator;
