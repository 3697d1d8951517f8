//! Financial enrichment. Attaches company market data to a job before analysis.
//!
//! `MockFinancialsProvider` stands in for a market data API: it waits a fixed
//! latency and answers from the static catalog.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AppError;
use crate::models::job::{Financials, Job};
use crate::scouting::catalog::{find_company, CompanyProfile, PRIVATE_FALLBACK, PRIVATE_SYMBOL};

/// Source of company financials. Carried in the pipeline as `Arc<dyn FinancialsProvider>`.
#[async_trait]
pub trait FinancialsProvider: Send + Sync {
    async fn enrich(&self, job: &Job) -> Result<Financials, AppError>;
}

pub struct MockFinancialsProvider {
    latency: Duration,
}

impl MockFinancialsProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl FinancialsProvider for MockFinancialsProvider {
    async fn enrich(&self, job: &Job) -> Result<Financials, AppError> {
        tokio::time::sleep(self.latency).await;
        let financials = lookup_financials(&job.company);
        debug!(
            "Enriched job {} ({}): symbol={}",
            job.id, job.company, financials.symbol
        );
        Ok(financials)
    }
}

/// Catalog lookup; unknown companies are reported as the private fallback.
pub fn lookup_financials(company: &str) -> Financials {
    let profile: &CompanyProfile = find_company(company).unwrap_or(&PRIVATE_FALLBACK);

    Financials {
        symbol: if profile.is_private {
            PRIVATE_SYMBOL.to_string()
        } else {
            profile.symbol.to_string()
        },
        price: profile.price,
        revenue_growth: profile.growth,
        is_private: profile.is_private,
        market_cap: profile.market_cap.to_string(),
    }
}
