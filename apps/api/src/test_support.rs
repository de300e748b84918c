//! In-memory fakes of the storage, telemetry and model ports.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::build::jobs::{BuildJob, JobRecorder};
use crate::llm_client::{LanguageModel, LlmError};
use crate::models::resume::StoredResume;
use crate::resumes::store::DocumentStore;

// ────────────────────────────────────────────────────────────────────────────
// Document store
// ────────────────────────────────────────────────────────────────────────────

/// A fresh row as the database would return it from an insert.
pub fn stored_row(user_id: Uuid, data: Value) -> StoredResume {
    let now = Utc::now();
    StoredResume {
        id: Uuid::new_v4(),
        user_id,
        data,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<Uuid, StoredResume>>,
    pub fail_updates: AtomicBool,
    pub update_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row directly, bypassing `persist`.
    pub fn seed(&self, user_id: Uuid, data: Value) -> StoredResume {
        let row = stored_row(user_id, data);
        self.rows.lock().unwrap().insert(row.id, row.clone());
        row
    }

    pub fn get(&self, id: Uuid) -> Option<StoredResume> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn persist(&self, user_id: Uuid, document: &Value) -> Result<StoredResume> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.values_mut().find(|row| row.user_id == user_id) {
            existing.data = document.clone();
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        let row = stored_row(user_id, document.clone());
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn load(&self, id: Uuid, user_id: Option<Uuid>) -> Result<Option<StoredResume>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&id)
            .filter(|row| user_id.map_or(true, |owner| row.user_id == owner))
            .cloned())
    }

    async fn update(&self, id: Uuid, document: &Value) -> Result<StoredResume> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(anyhow!("database unavailable"));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| anyhow!("resume {id} not found"))?;
        row.data = document.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job recorder
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingJobs {
    jobs: Mutex<Vec<BuildJob>>,
    pub fail: AtomicBool,
}

impl RecordingJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let jobs = Self::default();
        jobs.fail.store(true, Ordering::SeqCst);
        jobs
    }

    /// Every record the pipeline attempted to write, including failed writes.
    pub fn jobs(&self) -> Vec<BuildJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobRecorder for RecordingJobs {
    async fn record(&self, job: &BuildJob) -> Result<()> {
        self.jobs.lock().unwrap().push(job.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("telemetry table missing"));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Language models
// ────────────────────────────────────────────────────────────────────────────

/// Replays queued results in order; an exhausted script answers with an API error.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    pub calls: AtomicUsize,
    pub models: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn replying(raw: &str) -> Self {
        Self::new(vec![Ok(raw.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(
        &self,
        _prompt: &str,
        _system: &str,
        model: &str,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.models.lock().unwrap().push(model.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 500,
                    message: "script exhausted".to_string(),
                })
            })
    }
}

/// Never answers within any sane timeout.
pub struct HangingModel {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl HangingModel {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LanguageModel for HangingModel {
    async fn complete(
        &self,
        _prompt: &str,
        _system: &str,
        _model: &str,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok("{}".to_string())
    }
}

pub fn api_error(status: u16, message: &str) -> LlmError {
    LlmError::Api {
        status,
        message: message.to_string(),
    }
}
