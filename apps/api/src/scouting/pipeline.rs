//! Per-job pipeline: drives one job from `scraped` to `complete`.
//!
//! Flow: mark enriching → enrich → (analyze) → complete.
//!
//! Every transition is a single `upsert_by_identity` patch, so the collection is
//! updated after each phase and other jobs are never touched. An error from a step
//! is handled by `PipelineFailurePolicy`: the job either stays where it was
//! (`Stall`) or is moved to `failed` (`MarkFailed`).

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analysis::analyzer::JobAnalyzer;
use crate::errors::AppError;
use crate::models::job::{Job, JobStatus};
use crate::scouting::enrichment::FinancialsProvider;
use crate::scouting::store::{JobPatch, JobStore};

/// What happens to a job whose pipeline hits an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineFailurePolicy {
    /// Leave the job at its last status (`enriching` or `analyzing`) and log the error.
    #[default]
    Stall,
    /// Move the job to `failed` and record the error on it.
    MarkFailed,
}

impl FromStr for PipelineFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stall" => Ok(Self::Stall),
            "mark_failed" | "mark-failed" => Ok(Self::MarkFailed),
            other => Err(format!(
                "unknown pipeline failure policy '{other}' (expected 'stall' or 'mark_failed')"
            )),
        }
    }
}

/// How a single job's pipeline ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Completed { job_id: String, analyzed: bool },
    /// `status` is `None` when the job was removed from the store mid-pipeline.
    Stalled {
        job_id: String,
        status: Option<JobStatus>,
        error: String,
    },
    Failed { job_id: String, error: String },
}

/// Collaborators shared by every job's pipeline.
#[derive(Clone)]
pub struct PipelineContext {
    pub store: Arc<dyn JobStore>,
    pub financials: Arc<dyn FinancialsProvider>,
    /// `None` when no AI credential is configured; analysis is then skipped.
    pub analyzer: Option<Arc<dyn JobAnalyzer>>,
    pub failure_policy: PipelineFailurePolicy,
}

/// Runs the pipeline for a job already present in the store. Never returns an error:
/// failures are folded into the outcome according to the failure policy.
pub async fn process_job_pipeline(
    ctx: &PipelineContext,
    job_id: &str,
    resume_text: &str,
) -> PipelineOutcome {
    match run_steps(ctx, job_id, resume_text).await {
        Ok(analyzed) => PipelineOutcome::Completed {
            job_id: job_id.to_string(),
            analyzed,
        },
        Err(e) => handle_failure(ctx, job_id, e),
    }
}

/// Returns whether an analysis was attached.
async fn run_steps(ctx: &PipelineContext, job_id: &str, resume_text: &str) -> Result<bool, AppError> {
    // Step 1: scraped -> enriching
    let job: Job = ctx
        .store
        .upsert_by_identity(job_id, JobPatch::status(JobStatus::Enriching))?;

    // Step 2: enrichment
    let financials = ctx.financials.enrich(&job).await?;

    let Some(analyzer) = &ctx.analyzer else {
        warn!("No Anthropic API key configured; completing job {job_id} without analysis");
        ctx.store.upsert_by_identity(
            job_id,
            JobPatch::status(JobStatus::Complete).with_financials(financials),
        )?;
        return Ok(false);
    };

    let enriched = ctx.store.upsert_by_identity(
        job_id,
        JobPatch::status(JobStatus::Analyzing).with_financials(financials),
    )?;

    // Step 3: analysis
    let analysis = analyzer.analyze(&enriched, resume_text).await?;
    info!(
        "Job {job_id} complete: fit {}/100 ({:?})",
        analysis.fit_score, analysis.recommendation
    );
    ctx.store.upsert_by_identity(
        job_id,
        JobPatch::status(JobStatus::Complete).with_analysis(analysis),
    )?;

    Ok(true)
}

fn handle_failure(ctx: &PipelineContext, job_id: &str, e: AppError) -> PipelineOutcome {
    let status = ctx.store.find(job_id).map(|j| j.status);
    match status {
        Some(status) => error!("Pipeline failed for job {job_id} at {status:?}: {e}"),
        None => error!("Pipeline failed for job {job_id}, which is no longer stored: {e}"),
    }

    match ctx.failure_policy {
        PipelineFailurePolicy::Stall => PipelineOutcome::Stalled {
            job_id: job_id.to_string(),
            status,
            error: e.to_string(),
        },
        PipelineFailurePolicy::MarkFailed => {
            if let Err(store_err) = ctx
                .store
                .upsert_by_identity(job_id, JobPatch::failed(e.to_string()))
            {
                error!("Could not mark job {job_id} as failed: {store_err}");
            }
            PipelineOutcome::Failed {
                job_id: job_id.to_string(),
                error: e.to_string(),
            }
        }
    }
}
