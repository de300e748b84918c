//! Build orchestrator — drives one import from raw upload to stored document.
//!
//! ```text
//! Idle → ExtractingText → BuildingWithAi(1..=max_attempts) → Normalizing → Repairing → Persisted
//!                     ↘                     ↘                                     ↘
//!                                         Failed
//! ```
//!
//! Only model calls are retried. Parsing and normalization are total: a bad
//! model response is absorbed as a low-confidence document, never retried.
//! Exactly one job record is written per build, COMPLETED or FAILED.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::cost::calculate_cost;
use super::error::{BuildError, FatalError};
use super::jobs::{BuildJob, JobMetrics, JobRecorder};
use crate::config::BuildConfig;
use crate::document::{repair_document, SectionKey};
use crate::extraction::normalizer::DEFAULT_CONFIDENCE;
use crate::extraction::prompts::EXTRACTION_SYSTEM;
use crate::extraction::{
    build_extraction_prompt, decode_model_response, detect_text_format, normalize_response,
    BuildOptions, ParsedResponse,
};
use crate::llm_client::{LanguageModel, LlmError};
use crate::resumes::store::DocumentStore;
use crate::sources::{pdf, ExtractedText, ExtractionError, SourceData, TextExtractor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Idle,
    ExtractingText,
    BuildingWithAi { attempt: u32 },
    Normalizing,
    Repairing,
    Persisted,
    Failed,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStage::Idle => f.write_str("idle"),
            BuildStage::ExtractingText => f.write_str("extracting_text"),
            BuildStage::BuildingWithAi { attempt } => write!(f, "building_with_ai({attempt})"),
            BuildStage::Normalizing => f.write_str("normalizing"),
            BuildStage::Repairing => f.write_str("repairing"),
            BuildStage::Persisted => f.write_str("persisted"),
            BuildStage::Failed => f.write_str("failed"),
        }
    }
}

/// Which parts of the resume ended up with content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedSections {
    pub personal: bool,
    pub experience: bool,
    pub education: bool,
    pub skills: bool,
    pub projects: bool,
    pub certifications: bool,
    pub languages: bool,
    pub profiles: bool,
}

impl ExtractedSections {
    pub fn from_document(document: &Value) -> Self {
        let populated = |key: SectionKey| {
            document
                .pointer(&format!("/sections/{key}/items"))
                .and_then(Value::as_array)
                .is_some_and(|items| !items.is_empty())
        };
        Self {
            personal: document
                .pointer("/basics/name")
                .and_then(Value::as_str)
                .is_some_and(|name| !name.trim().is_empty()),
            experience: populated(SectionKey::Experience),
            education: populated(SectionKey::Education),
            skills: populated(SectionKey::Skills),
            projects: populated(SectionKey::Projects),
            certifications: populated(SectionKey::Certifications),
            languages: populated(SectionKey::Languages),
            profiles: populated(SectionKey::Profiles),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutcome {
    pub success: bool,
    pub resume_id: Uuid,
    pub resume_data: Value,
    pub confidence: f64,
    pub needs_review: bool,
    pub cost: u32,
    pub extracted_sections: ExtractedSections,
}

/// Per-build bookkeeping: the current stage and the metrics for the job record.
struct BuildRun {
    id: Uuid,
    stage: BuildStage,
    metrics: JobMetrics,
}

impl BuildRun {
    fn enter(&mut self, next: BuildStage) {
        debug!(build_id = %self.id, from = %self.stage, to = %next, "Build stage transition");
        self.stage = next;
    }
}

pub struct BuildOrchestrator {
    extractor: Arc<dyn TextExtractor>,
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn DocumentStore>,
    jobs: Arc<dyn JobRecorder>,
    config: BuildConfig,
}

impl BuildOrchestrator {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn DocumentStore>,
        jobs: Arc<dyn JobRecorder>,
        config: BuildConfig,
    ) -> Self {
        Self {
            extractor,
            model,
            store,
            jobs,
            config,
        }
    }

    /// Runs the whole pipeline. Fails only on unreadable input, exhausted
    /// model retries, or a storage error.
    pub async fn build_resume_from_source(
        &self,
        user_id: Uuid,
        source: SourceData,
        mut options: BuildOptions,
    ) -> Result<BuildOutcome, BuildError> {
        let started = Instant::now();
        // Pricing and prompt hints follow the upload itself.
        options.source_type = source.source_type();
        let model = options
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_model.as_str())
            .to_string();
        let source_type = source.source_type();
        let mut run = BuildRun {
            id: Uuid::new_v4(),
            stage: BuildStage::Idle,
            metrics: JobMetrics {
                ai_model: model.clone(),
                ..Default::default()
            },
        };

        info!(
            build_id = %run.id,
            user_id = %user_id,
            source_type = %source_type,
            model = %model,
            "Starting resume build"
        );

        let result = self
            .run(user_id, &source, &options, &model, &mut run)
            .await;
        run.metrics.processing_time_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                info!(
                    build_id = %run.id,
                    resume_id = %outcome.resume_id,
                    confidence = outcome.confidence,
                    needs_review = outcome.needs_review,
                    elapsed_ms = run.metrics.processing_time_ms,
                    "Resume build completed"
                );
                self.record_job(BuildJob::completed(user_id, source_type, run.metrics))
                    .await;
                Ok(outcome)
            }
            Err(err) => {
                run.enter(BuildStage::Failed);
                error!(build_id = %run.id, error = %err, "Resume build failed");
                let job = BuildJob::failed(user_id, source_type, run.metrics, &err);
                self.record_job(job).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        user_id: Uuid,
        source: &SourceData,
        options: &BuildOptions,
        model: &str,
        run: &mut BuildRun,
    ) -> Result<BuildOutcome, BuildError> {
        run.enter(BuildStage::ExtractingText);
        let extracted = self.extract_text(source).await?;
        run.metrics.text_length = extracted.text.chars().count();
        run.metrics.extraction_confidence = Some(extracted.confidence);
        run.metrics.cost = calculate_cost(&self.config.costs, options, run.metrics.text_length);

        let format = detect_text_format(&extracted.text);
        let prompt = build_extraction_prompt(&extracted.text, options, format);
        let raw = self.call_model(&prompt, model, run).await?;

        run.enter(BuildStage::Normalizing);
        let parsed = match parse_stage(&raw) {
            Ok(parsed) => parsed,
            Err(BuildError::Recoverable { reason, fallback }) => {
                warn!(build_id = %run.id, %reason, "Model response unusable; continuing with an empty document");
                *fallback
            }
            Err(err) => return Err(err),
        };
        let document = normalize_response(&parsed, options);

        run.enter(BuildStage::Repairing);
        let document = repair_document(&document);

        let stored = self
            .store
            .persist(user_id, &document)
            .await
            .map_err(FatalError::Storage)?;
        run.enter(BuildStage::Persisted);

        Ok(BuildOutcome {
            success: true,
            resume_id: stored.id,
            confidence: document
                .pointer("/metadata/confidence")
                .and_then(Value::as_f64)
                .unwrap_or(DEFAULT_CONFIDENCE),
            needs_review: document
                .pointer("/metadata/needsReview")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            cost: run.metrics.cost,
            extracted_sections: ExtractedSections::from_document(&document),
            resume_data: stored.data,
        })
    }

    /// PDF failures degrade to a lossy decode; other failures and empty text are fatal.
    async fn extract_text(&self, source: &SourceData) -> Result<ExtractedText, FatalError> {
        let extracted = match self.extractor.extract(source).await {
            Ok(extracted) => extracted,
            Err(err) => match source {
                SourceData::Pdf(bytes) => {
                    warn!(error = %err, "PDF extraction failed; falling back to raw decode");
                    pdf::decode_lossy(bytes)
                }
                _ => return Err(err.into()),
            },
        };

        if extracted.text.trim().is_empty() {
            return Err(ExtractionError::NoText.into());
        }
        debug!(
            chars = extracted.text.chars().count(),
            confidence = extracted.confidence,
            "Text extracted"
        );
        Ok(extracted)
    }

    /// Calls the model with a per-attempt timeout and exponential backoff.
    /// The last attempt's error is returned once attempts run out.
    async fn call_model(
        &self,
        prompt: &str,
        model: &str,
        run: &mut BuildRun,
    ) -> Result<String, FatalError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            run.enter(BuildStage::BuildingWithAi { attempt });
            let call = self.model.complete(prompt, EXTRACTION_SYSTEM, model);
            let result = match tokio::time::timeout(self.config.model_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.config.model_timeout)),
            };

            match result {
                Ok(raw) => return Ok(raw),
                Err(err) if attempt < max_attempts => {
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        build_id = %run.id,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Model call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(FatalError::Model(err)),
            }
        }
    }

    async fn record_job(&self, job: BuildJob) {
        if let Err(e) = self.jobs.record(&job).await {
            error!(job_id = %job.id, status = %job.status, "Failed to record build job: {e:#}");
        }
    }
}

/// Decodes the raw completion; an unusable response is reported as recoverable.
fn parse_stage(raw: &str) -> Result<ParsedResponse, BuildError> {
    decode_model_response(raw).map_err(BuildError::from)
}
