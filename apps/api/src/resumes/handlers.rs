use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::StoredResume;
use crate::resumes::service::{get_resume, update_resume};
use crate::state::AppState;

/// Owner scope for reads and writes. Omitted means unscoped.
#[derive(Deserialize)]
pub struct OwnerQuery {
    pub user_id: Option<Uuid>,
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<StoredResume>, AppError> {
    let resume = get_resume(state.documents.as_ref(), id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// PATCH /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<OwnerQuery>,
    Json(changes): Json<Value>,
) -> Result<Json<StoredResume>, AppError> {
    if !changes.is_object() {
        return Err(AppError::Validation(
            "Resume update must be a JSON object".to_string(),
        ));
    }
    let resume = update_resume(state.documents.as_ref(), id, params.user_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}
