//! Fit analysis. Asks the LLM for a structured verdict on one job.
//!
//! The model's JSON is parsed into a loose `RawAnalysis` and then validated into
//! `AiAnalysis`. Anything that goes wrong on the way (transport, status, parse,
//! validation) produces `AiAnalysis::fallback()` instead of an error.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use crate::analysis::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_RESUME_CHARS, ANALYSIS_TEMPERATURE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{
    render, truncate_chars, HYBRID_PROFILE_INSTRUCTION, JSON_ONLY_SYSTEM,
};
use crate::llm_client::LlmClient;
use crate::models::analysis::{AiAnalysis, Recommendation};
use crate::models::job::Job;

/// The analysis step of the pipeline. Implement this to swap backends without
/// touching the pipeline.
///
/// Carried in the pipeline as `Option<Arc<dyn JobAnalyzer>>`; `None` means the
/// AI capability is unavailable.
#[async_trait]
pub trait JobAnalyzer: Send + Sync {
    async fn analyze(&self, job: &Job, resume_text: &str) -> Result<AiAnalysis, AppError>;
}

/// Claude-backed analyzer. Never returns `Err`: failures become the fallback verdict.
pub struct LlmJobAnalyzer(pub LlmClient);

#[async_trait]
impl JobAnalyzer for LlmJobAnalyzer {
    async fn analyze(&self, job: &Job, resume_text: &str) -> Result<AiAnalysis, AppError> {
        Ok(analyze_job_match(&self.0, job, resume_text).await)
    }
}

/// Shape of the model's reply before validation.
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    fit_score: i64,
    recommendation: String,
    pros_cons: Vec<String>,
    growth_verdict: String,
}

impl TryFrom<RawAnalysis> for AiAnalysis {
    type Error = String;

    fn try_from(raw: RawAnalysis) -> Result<Self, Self::Error> {
        let fit_score = u8::try_from(raw.fit_score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| format!("fit_score {} outside 0-100", raw.fit_score))?;

        let recommendation = match raw.recommendation.trim() {
            "Apply" => Recommendation::Apply,
            "Avoid" => Recommendation::Avoid,
            "Network First" => Recommendation::NetworkFirst,
            other => return Err(format!("unknown recommendation '{other}'")),
        };

        if raw.growth_verdict.trim().is_empty() {
            return Err("growth_verdict is empty".to_string());
        }

        Ok(AiAnalysis {
            fit_score,
            recommendation,
            pros_cons: raw
                .pros_cons
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            growth_verdict: raw.growth_verdict.trim().to_string(),
        })
    }
}

/// Runs the fit analysis, returning the fallback verdict on any failure.
pub async fn analyze_job_match(llm: &LlmClient, job: &Job, resume_text: &str) -> AiAnalysis {
    match request_analysis(llm, job, resume_text).await {
        Ok(analysis) => {
            info!(
                "Analysis for job {}: {}/100 ({:?})",
                job.id, analysis.fit_score, analysis.recommendation
            );
            analysis
        }
        Err(e) => {
            error!("Analysis failed for job {}: {e}", job.id);
            AiAnalysis::fallback()
        }
    }
}

async fn request_analysis(
    llm: &LlmClient,
    job: &Job,
    resume_text: &str,
) -> Result<AiAnalysis, AppError> {
    let prompt = build_analysis_prompt(job, resume_text);
    let raw: RawAnalysis = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM, Some(ANALYSIS_TEMPERATURE))
        .await
        .map_err(|e| AppError::Llm(format!("fit analysis request failed: {e}")))?;

    AiAnalysis::try_from(raw).map_err(|e| AppError::Llm(format!("invalid fit analysis: {e}")))
}

pub fn build_analysis_prompt(job: &Job, resume_text: &str) -> String {
    let financials = job.financials.as_ref();
    let company_type = match financials {
        Some(f) if f.is_private => "Private",
        Some(_) => "Public",
        None => "Unknown",
    };
    let market_cap = financials
        .map(|f| f.market_cap.as_str())
        .unwrap_or("N/A");
    let revenue_growth = format!(
        "{:.0}",
        financials.map(|f| f.revenue_growth).unwrap_or(0.0) * 100.0
    );

    render(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("profile_instruction", HYBRID_PROFILE_INSTRUCTION),
            ("resume", truncate_chars(resume_text, ANALYSIS_RESUME_CHARS)),
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("description", job.description.as_str()),
            ("company_type", company_type),
            ("market_cap", market_cap),
            ("revenue_growth", revenue_growth.as_str()),
        ],
    )
}
