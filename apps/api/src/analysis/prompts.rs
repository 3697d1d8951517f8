// All LLM prompt constants for the Analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Resume prefix length sent with fit analysis requests.
pub const ANALYSIS_RESUME_CHARS: usize = 2000;

pub const ANALYSIS_TEMPERATURE: f32 = 0.4;
pub const TAILOR_TEMPERATURE: f32 = 0.7;

/// Fit analysis prompt template. Sent with `JSON_ONLY_SYSTEM`.
/// Replace: {profile_instruction}, {resume}, {title}, {company}, {description},
///          {company_type}, {market_cap}, {revenue_growth}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an AI analyst evaluating a job opportunity for a candidate.
{profile_instruction}

Candidate Resume Summary:
{resume}... (truncated for context)

Job Details:
Title: {title}
Company: {company}
Description: {description}

Company Financials:
Type: {company_type}
Market Cap: {market_cap}
Revenue Growth (YoY): {revenue_growth}%

Task:
Analyze the fit based on the job description, company financials, and candidate profile.
Filter out low-potential or misaligned roles.

Return a JSON object with this EXACT schema (no extra fields):
{
  "fit_score": 72,
  "recommendation": "Apply",
  "pros_cons": ["Strength or weakness as a short bullet"],
  "growth_verdict": "One paragraph on the company's financial outlook."
}

Rules:
- fit_score is an integer from 0 to 100 representing candidate fit.
- recommendation is exactly one of "Apply", "Avoid", "Network First".
- pros_cons lists strengths and weaknesses as short strings.
- growth_verdict analyzes the company's financial outlook."#;

/// System prompt for resume tailoring. Output is Markdown, not JSON.
pub const TAILOR_SYSTEM: &str = "You are an expert career strategist. \
    You rewrite resumes to align with a specific job without inventing experience.";

/// Resume tailoring prompt template.
/// Replace: {profile_instruction}, {title}, {company}, {description}, {resume}
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"JOB TARGET:
Title: {title}
Company: {company}
Description: {description}

CANDIDATE RESUME:
{resume}

TASK:
Rewrite the candidate's resume summary and key bullet points to align with this specific job description.
- Highlight the most relevant skills found in the job description that the candidate possesses.
- Adjust terminology to match the company's language.
- {profile_instruction}
- Return the response as Markdown text, starting with a new "Tailored Summary" and then "Key Experience Highlights"."#;

/// Chat assistant system instruction. Replace: {resume}
pub const CHAT_SYSTEM_TEMPLATE: &str = r#"You are a helpful AI Career Coach for the following candidate.

CANDIDATE CONTEXT:
{resume}

Your goal is to help them navigate their job search, analyze opportunities, and provide strategic advice.
Be concise, professional, and encouraging."#;
