use serde::{Deserialize, Serialize};

/// The closed set of verdicts the fit analysis may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Apply,
    Avoid,
    #[serde(rename = "Network First")]
    NetworkFirst,
}

/// Validated result of a fit analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub fit_score: u8, // 0 – 100
    pub recommendation: Recommendation,
    pub pros_cons: Vec<String>,
    pub growth_verdict: String,
}

impl AiAnalysis {
    /// Score above which a job counts as a high fit in the dashboard stats.
    pub const HIGH_FIT_THRESHOLD: u8 = 75;

    /// Deterministic result used whenever the remote analysis cannot be obtained.
    pub fn fallback() -> Self {
        Self {
            fit_score: 0,
            recommendation: Recommendation::Avoid,
            pros_cons: vec!["Error analyzing job data".to_string()],
            growth_verdict: "Unable to determine.".to_string(),
        }
    }

    pub fn is_high_fit(&self) -> bool {
        self.fit_score > Self::HIGH_FIT_THRESHOLD
    }
}
