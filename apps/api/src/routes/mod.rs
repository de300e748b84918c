pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::build::handlers as build_handlers;
use crate::resumes::handlers as resume_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Import pipeline
        .route(
            "/api/v1/resumes/import",
            post(build_handlers::handle_import),
        )
        // Stored documents
        .route(
            "/api/v1/resumes/:id",
            get(resume_handlers::handle_get_resume).patch(resume_handlers::handle_update_resume),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::build::BuildOrchestrator;
    use crate::config::BuildConfig;
    use crate::llm_client::LanguageModel;
    use crate::sources::DefaultExtractor;
    use crate::test_support::{api_error, MemoryStore, RecordingJobs, ScriptedModel};

    const BOUNDARY: &str = "resume-import-boundary";

    fn app_with(model: Arc<dyn LanguageModel>) -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = BuildConfig {
            retry_base_delay: std::time::Duration::from_millis(1),
            ..BuildConfig::default()
        };
        let orchestrator = BuildOrchestrator::new(
            Arc::new(DefaultExtractor),
            model,
            store.clone(),
            Arc::new(RecordingJobs::new()),
            config,
        );
        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            documents: store.clone(),
        };
        (build_router(state), store)
    }

    fn multipart(fields: &[(&str, &str)]) -> Body {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn import_request(user_id: Uuid, fields: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/resumes/import?user_id={user_id}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart(fields))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(Arc::new(ScriptedModel::default()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], json!("resume-import-api"));
    }

    #[tokio::test]
    async fn test_get_unknown_resume_is_404() {
        let (app, _) = app_with(Arc::new(ScriptedModel::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/resumes/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_get_repairs_ai_document() {
        let (app, store) = app_with(Arc::new(ScriptedModel::default()));
        let owner = Uuid::new_v4();
        let row = store.seed(
            owner,
            json!({"sections": {"projects": [{"name": "CLI"}]}, "metadata": {"aiGenerated": true}}),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/resumes/{}?user_id={owner}", row.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let projects = &body["data"]["sections"]["projects"];
        assert_eq!(projects["name"], json!("Projects"));
        assert_eq!(projects["items"][0]["name"], json!("CLI"));
        assert!(body["data"]["sections"]["awards"]["items"].is_array());
    }

    #[tokio::test]
    async fn test_patch_merges_top_level() {
        let (app, store) = app_with(Arc::new(ScriptedModel::default()));
        let row = store.seed(Uuid::new_v4(), json!({"basics": {"name": "Jane"}}));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri(format!("/api/v1/resumes/{}", row.id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"notes":"draft"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            store.get(row.id).unwrap().data,
            json!({"basics": {"name": "Jane"}, "notes": "draft"})
        );
    }

    #[tokio::test]
    async fn test_patch_rejects_non_object() {
        let (app, store) = app_with(Arc::new(ScriptedModel::default()));
        let row = store.seed(Uuid::new_v4(), json!({}));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri(format!("/api/v1/resumes/{}", row.id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("[1, 2]"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_text_builds_and_stores() {
        let model = Arc::new(ScriptedModel::replying(
            r#"{"extractedData": {"personal": {"name": "Jane Doe"}, "skills": ["Rust"]}, "confidence": 0.9}"#,
        ));
        let (app, store) = app_with(model.clone());
        let user_id = Uuid::new_v4();

        let response = app
            .oneshot(import_request(
                user_id,
                &[("source_type", "text"), ("text", "Jane Doe\nSKILLS\nRust"), ("template", "onyx")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["cost"], json!(10));
        assert_eq!(body["resumeData"]["basics"]["name"], json!("Jane Doe"));
        assert_eq!(body["resumeData"]["metadata"]["template"], json!("onyx"));
        assert_eq!(body["extractedSections"]["skills"], json!(true));

        let resume_id: Uuid = serde_json::from_value(body["resumeId"].clone()).unwrap();
        assert_eq!(store.get(resume_id).unwrap().user_id, user_id);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_import_model_failure_is_502() {
        let model = Arc::new(ScriptedModel::new(vec![
            Err(api_error(529, "overloaded")),
            Err(api_error(529, "overloaded")),
            Err(api_error(529, "still overloaded")),
        ]));
        let (app, store) = app_with(model);

        let response = app
            .oneshot(import_request(Uuid::new_v4(), &[("text", "Jane Doe")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], json!("AI_ERROR"));
        assert_eq!(
            body["error"]["message"],
            json!("API error (status 529): still overloaded")
        );
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_import_blank_text_is_422() {
        let (app, _) = app_with(Arc::new(ScriptedModel::default()));

        let response = app
            .oneshot(import_request(Uuid::new_v4(), &[("text", "   ")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json_body(response).await["error"]["message"],
            json!("No text could be extracted")
        );
    }
}
