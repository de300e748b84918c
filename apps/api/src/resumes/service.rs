//! Read and update paths for stored resumes.
//!
//! AI-generated documents are repaired on every read. The repair is pure and
//! idempotent, so concurrent readers need no lock; at worst two of them write
//! back the same repaired value.

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::store::DocumentStore;
use crate::document::repair::ReadRepair;
use crate::document::{is_ai_generated, repair_document, repair_document_on_read};
use crate::models::resume::StoredResume;

/// Loads a resume, repairing AI-generated documents before returning them.
/// The repaired value is written back only when the repair changed something.
pub async fn get_resume(
    store: &dyn DocumentStore,
    id: Uuid,
    user_id: Option<Uuid>,
) -> Result<Option<StoredResume>> {
    let Some(mut stored) = store.load(id, user_id).await? else {
        return Ok(None);
    };
    if !is_ai_generated(&stored.data) {
        return Ok(Some(stored));
    }

    let ReadRepair { document, changed } = repair_document_on_read(std::mem::take(&mut stored.data));
    if !changed {
        debug!(resume_id = %id, "Stored resume already canonical");
        stored.data = document;
        return Ok(Some(stored));
    }

    info!(resume_id = %id, "Repaired stored resume on read, writing back");
    match store.update(id, &document).await {
        Ok(updated) => Ok(Some(updated)),
        Err(e) => {
            warn!(resume_id = %id, "Failed to write back repaired resume: {e:#}");
            stored.data = document;
            Ok(Some(stored))
        }
    }
}

/// Applies an edit. Top-level keys of `changes` replace the stored ones; the
/// result is repaired when either side is AI-generated.
pub async fn update_resume(
    store: &dyn DocumentStore,
    id: Uuid,
    user_id: Option<Uuid>,
    changes: Value,
) -> Result<Option<StoredResume>> {
    let Some(existing) = store.load(id, user_id).await? else {
        return Ok(None);
    };

    let stored_ai = is_ai_generated(&existing.data);
    let incoming_ai = is_ai_generated(&changes);
    let mut document = merge_top_level(existing.data, changes);
    if stored_ai || incoming_ai {
        document = repair_document(&document);
    }

    Ok(Some(store.update(id, &document).await?))
}

fn merge_top_level(existing: Value, changes: Value) -> Value {
    match (existing, changes) {
        (Value::Object(mut base), Value::Object(changes)) => {
            base.extend(changes);
            Value::Object(base)
        }
        (_, changes) => changes,
    }
}
