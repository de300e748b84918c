mod build;
mod config;
mod db;
mod document;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod resumes;
mod routes;
mod sources;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::build::jobs::PgJobRecorder;
use crate::build::BuildOrchestrator;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::resumes::{DocumentStore, PgDocumentStore};
use crate::routes::build_router;
use crate::sources::DefaultExtractor;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume import API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let documents: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(db.clone()));
    let jobs = Arc::new(PgJobRecorder::new(db));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.build.model_timeout)?;
    info!(
        "LLM client initialized (default model: {}, timeout: {:?}, attempts: {})",
        config.build.default_model, config.build.model_timeout, config.build.max_attempts
    );

    let orchestrator = BuildOrchestrator::new(
        Arc::new(DefaultExtractor),
        Arc::new(llm),
        documents.clone(),
        jobs,
        config.build.clone(),
    );

    // Build app state
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        documents,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor's deploy domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
