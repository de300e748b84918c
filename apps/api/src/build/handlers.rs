use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::build::orchestrator::BuildOutcome;
use crate::errors::AppError;
use crate::extraction::BuildOptions;
use crate::sources::{SourceData, SourceType};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Fields of the import form, collected before any of them is interpreted.
#[derive(Debug, Default)]
pub struct ImportForm {
    pub source_type: Option<String>,
    pub file: Option<Bytes>,
    pub file_name: Option<String>,
    pub text: Option<String>,
    pub linkedin: Option<String>,
    pub model: Option<String>,
    pub template: Option<String>,
}

impl ImportForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ImportForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    form.file_name = field.file_name().map(str::to_string);
                    form.file = Some(field.bytes().await.map_err(multipart_error)?);
                }
                "source_type" => form.source_type = Some(field.text().await.map_err(multipart_error)?),
                "text" => form.text = Some(field.text().await.map_err(multipart_error)?),
                "linkedin" => form.linkedin = Some(field.text().await.map_err(multipart_error)?),
                "model" => form.model = Some(field.text().await.map_err(multipart_error)?),
                "template" => form.template = Some(field.text().await.map_err(multipart_error)?),
                // Unknown fields are drained and ignored.
                _ => {
                    field.bytes().await.map_err(multipart_error)?;
                }
            }
        }
        Ok(form)
    }

    /// Resolves the declared (or inferred) source type against the supplied payload.
    pub fn into_request(self) -> Result<(SourceData, BuildOptions), AppError> {
        let source_type = match self.source_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => declared
                .parse::<SourceType>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
            _ => self.inferred_type()?,
        };

        let source = match source_type {
            SourceType::Text => {
                let text = match (self.text, self.file) {
                    (Some(text), _) => text,
                    (None, Some(file)) => String::from_utf8_lossy(&file).into_owned(),
                    (None, None) => return Err(missing("text")),
                };
                SourceData::Text(text)
            }
            SourceType::Pdf => SourceData::Pdf(self.file.ok_or_else(|| missing("file"))?),
            SourceType::Doc => SourceData::Doc(self.file.ok_or_else(|| missing("file"))?),
            SourceType::LinkedIn => {
                let raw = match (self.linkedin, self.file) {
                    (Some(raw), _) => Bytes::from(raw),
                    (None, Some(file)) => file,
                    (None, None) => return Err(missing("linkedin")),
                };
                let export: Value = serde_json::from_slice(&raw).map_err(|e| {
                    AppError::Validation(format!("LinkedIn export is not valid JSON: {e}"))
                })?;
                SourceData::LinkedIn(export)
            }
        };

        let options = BuildOptions {
            source_type,
            model: self.model.filter(|m| !m.trim().is_empty()),
            template: self.template.filter(|t| !t.trim().is_empty()),
            language: None,
        };
        Ok((source, options))
    }

    fn inferred_type(&self) -> Result<SourceType, AppError> {
        if self.linkedin.is_some() {
            return Ok(SourceType::LinkedIn);
        }
        if self.text.is_some() {
            return Ok(SourceType::Text);
        }
        let Some(file) = &self.file else {
            return Err(AppError::Validation(
                "One of `file`, `text` or `linkedin` is required".to_string(),
            ));
        };
        if file.starts_with(b"%PDF") {
            return Ok(SourceType::Pdf);
        }
        let extension = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("pdf") => Ok(SourceType::Pdf),
            Some("doc") | Some("docx") => Ok(SourceType::Doc),
            Some("json") => Ok(SourceType::LinkedIn),
            _ => Ok(SourceType::Text),
        }
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Could not read form field: {e}"))
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("Missing `{field}` field for this source type"))
}

/// POST /api/v1/resumes/import
pub async fn handle_import(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    multipart: Multipart,
) -> Result<Json<BuildOutcome>, AppError> {
    let (source, options) = ImportForm::read(multipart).await?.into_request()?;
    let outcome = state
        .orchestrator
        .build_resume_from_source(params.user_id, source, options)
        .await?;
    Ok(Json(outcome))
}
