use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::ANTHROPIC_API_URL;
use crate::scouting::pipeline::PipelineFailurePolicy;

/// Application configuration loaded from environment variables.
/// Everything has a default; a missing `ANTHROPIC_API_KEY` disables the AI features
/// instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub scout: ScoutConfig,
    pub llm_timeout: Duration,
    pub llm_max_attempts: u32,
}

/// Tunables for a scouting session and the per-job pipeline.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub batch_size: usize,
    /// Bounds of the random pause between two generated jobs.
    pub pacing_min: Duration,
    pub pacing_max: Duration,
    /// Simulated latency of the financial data lookup.
    pub enrichment_latency: Duration,
    pub failure_policy: PipelineFailurePolicy,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            pacing_min: Duration::from_millis(800),
            pacing_max: Duration::from_millis(1800),
            enrichment_latency: Duration::from_millis(800),
            failure_policy: PipelineFailurePolicy::Stall,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            anthropic_api_url: ANTHROPIC_API_URL.to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            scout: ScoutConfig::default(),
            llm_timeout: Duration::from_secs(120),
            llm_max_attempts: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ScoutConfig::default();

        let scout = ScoutConfig {
            batch_size: parse_env("SCOUT_BATCH_SIZE", defaults.batch_size)?,
            pacing_min: Duration::from_millis(parse_env(
                "SCOUT_PACING_MIN_MS",
                defaults.pacing_min.as_millis() as u64,
            )?),
            pacing_max: Duration::from_millis(parse_env(
                "SCOUT_PACING_MAX_MS",
                defaults.pacing_max.as_millis() as u64,
            )?),
            enrichment_latency: Duration::from_millis(parse_env(
                "ENRICHMENT_LATENCY_MS",
                defaults.enrichment_latency.as_millis() as u64,
            )?),
            failure_policy: parse_env("PIPELINE_FAILURE_POLICY", defaults.failure_policy)?,
        };

        if scout.pacing_min > scout.pacing_max {
            bail!("SCOUT_PACING_MIN_MS must not exceed SCOUT_PACING_MAX_MS");
        }

        let llm_max_attempts: u32 = parse_env("LLM_MAX_ATTEMPTS", 1)?;
        if llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional_env("ANTHROPIC_API_URL")
                .unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scout,
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            llm_max_attempts,
        })
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
