//! Build job telemetry: one write-once record per build attempt.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::error::BuildError;
use crate::sources::SourceType;

pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;
pub const MAX_ERROR_STACK_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields measured while the build ran, shared by both terminal records.
#[derive(Debug, Clone, Default)]
pub struct JobMetrics {
    pub text_length: usize,
    pub ai_model: String,
    pub cost: u32,
    pub processing_time_ms: u64,
    pub extraction_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildJob {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: JobStatus,
    pub source_type: SourceType,
    pub text_length: usize,
    pub ai_model: String,
    pub cost: u32,
    pub processing_time_ms: u64,
    pub extraction_confidence: Option<f64>,
    pub error_message: Option<String>,
    pub error_stack: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BuildJob {
    fn new(user_id: Uuid, source_type: SourceType, status: JobStatus, metrics: JobMetrics) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            status,
            source_type,
            text_length: metrics.text_length,
            ai_model: metrics.ai_model,
            cost: metrics.cost,
            processing_time_ms: metrics.processing_time_ms,
            extraction_confidence: metrics.extraction_confidence,
            error_message: None,
            error_stack: None,
            created_at: Utc::now(),
        }
    }

    pub fn completed(user_id: Uuid, source_type: SourceType, metrics: JobMetrics) -> Self {
        Self::new(user_id, source_type, JobStatus::Completed, metrics)
    }

    /// Error text is truncated so a runaway message cannot bloat the table.
    pub fn failed(
        user_id: Uuid,
        source_type: SourceType,
        metrics: JobMetrics,
        error: &BuildError,
    ) -> Self {
        Self {
            error_message: Some(truncate_chars(&error.to_string(), MAX_ERROR_MESSAGE_CHARS)),
            error_stack: Some(truncate_chars(&format!("{error:?}"), MAX_ERROR_STACK_CHARS)),
            ..Self::new(user_id, source_type, JobStatus::Failed, metrics)
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Write-once sink for build records. Callers log failures and move on.
#[async_trait]
pub trait JobRecorder: Send + Sync {
    async fn record(&self, job: &BuildJob) -> Result<()>;
}

pub struct PgJobRecorder {
    pool: PgPool,
}

impl PgJobRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRecorder for PgJobRecorder {
    async fn record(&self, job: &BuildJob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO resume_build_jobs
                (id, user_id, status, source_type, text_length, ai_model, cost,
                 processing_time_ms, extraction_confidence, error_message, error_stack, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(job.id)
        .bind(job.user_id)
        .bind(job.status.as_str())
        .bind(job.source_type.as_str())
        .bind(i64::try_from(job.text_length).unwrap_or(i64::MAX))
        .bind(&job.ai_model)
        .bind(i32::try_from(job.cost).unwrap_or(i32::MAX))
        .bind(i64::try_from(job.processing_time_ms).unwrap_or(i64::MAX))
        .bind(job.extraction_confidence)
        .bind(job.error_message.as_deref())
        .bind(job.error_stack.as_deref())
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_failed_job_truncates_error() {
        let error: BuildError = LlmError::Api {
            status: 500,
            message: "x".repeat(3000),
        }
        .into();
        let job = BuildJob::failed(Uuid::new_v4(), SourceType::Pdf, JobMetrics::default(), &error);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_ref().unwrap().chars().count(), MAX_ERROR_MESSAGE_CHARS);
        assert_eq!(job.error_stack.as_ref().unwrap().chars().count(), MAX_ERROR_STACK_CHARS);
    }

    #[test]
    fn test_completed_job_has_no_error() {
        let metrics = JobMetrics {
            text_length: 42,
            ai_model: "claude-sonnet-4-5".into(),
            cost: 10,
            processing_time_ms: 7,
            extraction_confidence: Some(1.0),
        };
        let job = BuildJob::completed(Uuid::new_v4(), SourceType::Text, metrics);
        assert_eq!(job.status.to_string(), "COMPLETED");
        assert_eq!(job.text_length, 42);
        assert!(job.error_message.is_none());
        assert!(job.error_stack.is_none());
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }
}
