use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::build::cost::CostTable;
use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub build: BuildConfig,
}

/// Knobs for the import pipeline. Handed to the orchestrator at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub default_model: String,
    /// Wall-clock budget for one model call.
    pub model_timeout: Duration,
    pub max_attempts: u32,
    /// Backoff before retry n is `retry_base_delay * 2^(n-1)`.
    pub retry_base_delay: Duration,
    pub costs: CostTable,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            model_timeout: Duration::from_secs(45),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            costs: CostTable::default(),
        }
    }
}

impl BuildConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let costs = &defaults.costs;

        Ok(BuildConfig {
            default_model: std::env::var("AI_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.default_model.clone()),
            model_timeout: Duration::from_secs(parse_env("AI_TIMEOUT_SECS", 45)?),
            max_attempts: defaults.max_attempts,
            retry_base_delay: Duration::from_millis(parse_env("AI_RETRY_BASE_MS", 1000)?),
            costs: CostTable {
                base: parse_env("COST_BASE", costs.base)?,
                pdf_surcharge: parse_env("COST_PDF_SURCHARGE", costs.pdf_surcharge)?,
                doc_surcharge: parse_env("COST_DOC_SURCHARGE", costs.doc_surcharge)?,
                linkedin_surcharge: parse_env("COST_LINKEDIN_SURCHARGE", costs.linkedin_surcharge)?,
                text_surcharge: parse_env("COST_TEXT_SURCHARGE", costs.text_surcharge)?,
            },
        })
    }

    /// Delay before the attempt after `failed_attempt` (1-based).
    pub fn retry_delay(&self, failed_attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(failed_attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.retry_base_delay.saturating_mul(factor)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            build: BuildConfig::from_env()?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
