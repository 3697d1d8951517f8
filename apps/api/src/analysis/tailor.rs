use tracing::{error, info};

use crate::analysis::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM, TAILOR_TEMPERATURE};
use crate::llm_client::prompts::{render, HYBRID_PROFILE_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::job::Job;

pub const TAILOR_EMPTY_REPLY: &str = "Could not generate tailored resume.";
pub const TAILOR_ERROR_REPLY: &str = "Error generating tailored resume.";

/// Rewrites the full resume for one job as Markdown. Failures are returned as a
/// fixed diagnostic string rather than an error.
pub async fn tailor_resume(llm: &LlmClient, job: &Job, resume_text: &str) -> String {
    let prompt = render(
        TAILOR_PROMPT_TEMPLATE,
        &[
            ("title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("description", job.description.as_str()),
            ("resume", resume_text),
            ("profile_instruction", HYBRID_PROFILE_INSTRUCTION),
        ],
    );

    match llm.call(&prompt, TAILOR_SYSTEM, Some(TAILOR_TEMPERATURE)).await {
        Ok(response) => match response.text().map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                info!("Tailored resume for job {} ({} chars)", job.id, text.len());
                text.to_string()
            }
            None => TAILOR_EMPTY_REPLY.to_string(),
        },
        Err(e) => {
            error!("Resume tailoring failed for job {}: {e}", job.id);
            TAILOR_ERROR_REPLY.to_string()
        }
    }
}
