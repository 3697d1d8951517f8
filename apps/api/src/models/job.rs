use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::analysis::AiAnalysis;

/// Lifecycle of a job inside the scouting pipeline.
///
/// `Failed` is only reachable under `PipelineFailurePolicy::MarkFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scraped,
    Enriching,
    Analyzing,
    Complete,
    Failed,
}

impl JobStatus {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// `Enriching -> Complete` is the path taken when no analyzer is configured.
    /// Setting the same status again is allowed so a patch can carry data only.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Scraped, Enriching)
                | (Enriching, Analyzing)
                | (Enriching, Complete)
                | (Analyzing, Complete)
                | (Enriching, Failed)
                | (Analyzing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobSource {
    LinkedIn,
    Indeed,
    Glassdoor,
}

/// Company financial snapshot attached during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub symbol: String,
    pub price: f64,
    /// Year-over-year revenue growth as a fraction (0.15 = 15%).
    pub revenue_growth: f64,
    pub is_private: bool,
    pub market_cap: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub is_remote: bool,
    pub posted_date: DateTime<Utc>,
    pub description: String,
    pub salary_min: u32,
    pub salary_max: u32,
    pub source: JobSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financials: Option<Financials>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AiAnalysis>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Best-effort web search link for the posting. The synthetic jobs have no
    /// canonical URL, so this searches for title + company instead.
    pub fn search_url(&self) -> String {
        let query = format!("{} {} jobs", self.title, self.company);
        format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(&query)
        )
    }

    pub fn salary_midpoint(&self) -> u32 {
        ((u64::from(self.salary_min) + u64::from(self.salary_max)) / 2) as u32
    }

    /// The role's salary midpoint slotted into the fixed market ladder, lowest band first.
    pub fn compensation_bands(&self) -> Vec<CompensationBand> {
        let this_role = CompensationBand {
            level: "This Role",
            salary: self.salary_midpoint(),
            is_this_role: true,
        };
        let mut bands: Vec<CompensationBand> = MARKET_BANDS
            .iter()
            .map(|&(level, salary)| CompensationBand {
                level,
                salary,
                is_this_role: false,
            })
            .collect();
        let at = bands
            .iter()
            .position(|b| b.salary > this_role.salary)
            .unwrap_or(bands.len());
        bands.insert(at, this_role);
        bands
    }
}

const MARKET_BANDS: [(&str, u32); 5] = [
    ("Junior", 110_000),
    ("Mid-Level", 135_000),
    ("Senior", 160_000),
    ("Lead", 190_000),
    ("Principal", 210_000),
];

/// One bar of the compensation comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompensationBand {
    pub level: &'static str,
    pub salary: u32,
    pub is_this_role: bool,
}

/// User-entered search parameters plus the resume used as analysis context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub resume_text: String,
}
