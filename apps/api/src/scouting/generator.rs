//! Mock job feed. Fills a fixed posting template from the search criteria and
//! the company catalog. Randomness is injected so tests can seed it.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::models::job::{Job, JobSource, JobStatus, SearchCriteria};
use crate::scouting::catalog::{COMPANIES, JOB_TITLES, LOCATIONS, REMOTE_LOCATION};

pub const SALARY_MIN_FLOOR: u32 = 120_000;
pub const SALARY_MIN_SPREAD: u32 = 50_000;
pub const SALARY_MAX_FLOOR: u32 = 180_000;
pub const SALARY_MAX_SPREAD: u32 = 100_000;

const JOB_ID_LEN: usize = 8;

/// Random lowercase alphanumeric identifier.
pub fn new_job_id<R: Rng>(rng: &mut R) -> String {
    (0..JOB_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect()
}

/// Produces one synthetic posting in `scraped` status. Never fails.
pub fn generate_mock_job<R: Rng>(criteria: &SearchCriteria, rng: &mut R) -> Job {
    let company = &COMPANIES[rng.gen_range(0..COMPANIES.len())];

    let title = match criteria.job_title.trim() {
        "" => JOB_TITLES[rng.gen_range(0..JOB_TITLES.len())].to_string(),
        t => t.to_string(),
    };

    let location = if criteria.is_remote {
        REMOTE_LOCATION.to_string()
    } else {
        match criteria.location.trim() {
            "" => LOCATIONS[rng.gen_range(0..LOCATIONS.len())].to_string(),
            l => l.to_string(),
        }
    };

    let salary_min = SALARY_MIN_FLOOR + rng.gen_range(0..SALARY_MIN_SPREAD);
    let salary_max = SALARY_MAX_FLOOR + rng.gen_range(0..SALARY_MAX_SPREAD);

    let source = if rng.gen_bool(0.5) {
        JobSource::LinkedIn
    } else {
        JobSource::Indeed
    };

    Job {
        id: new_job_id(rng),
        description: describe(&title, company.name),
        title,
        company: company.name.to_string(),
        location,
        is_remote: criteria.is_remote,
        posted_date: Utc::now(),
        salary_min,
        salary_max,
        source,
        financials: None,
        analysis: None,
        status: JobStatus::Scraped,
        error: None,
    }
}

fn describe(title: &str, company: &str) -> String {
    format!(
        "We are seeking a {title} to join our team at {company}.

Responsibilities:
- Bridge the gap between technical teams and commercial sales.
- Drive revenue growth through technical demonstrations.
- Manage key enterprise relationships.

Requirements:
- 5+ years in technical sales or solution architecture.
- Strong understanding of cloud infrastructure.
- Proven track record of meeting quotas.

Benefits:
- Competitive salary and equity.
- Remote work options."
    )
}
