//! Search criteria shared by the scout launcher, tailoring and chat.

pub mod handlers;

use std::sync::RwLock;

use crate::models::job::SearchCriteria;

/// Resume used until the user supplies their own.
pub const DEFAULT_RESUME: &str = r#"ALEX MORGAN
Austin, TX | alex.morgan@example.com

SUMMARY
Program management and sales leadership executive with 10+ years of experience driving
cross-functional transformations in e-commerce, supply chain, and CPG. Leads high-impact
programs that optimize operations, grow revenue, and improve customer success for
enterprise clients. Data-driven decision maker using SQL, Tableau, and Python.

EXPERIENCE
Senior Program Manager, Supply Chain (2024 - Present)
- Led inbound supply chain architecture for 3,000+ third-party sellers, cutting fulfillment fees 12% YoY.
- Drove a 99% in-stock rate during peak events through forecasting models and stakeholder alignment.

Manager of Customer Success Managers (2022 - 2024)
- Directed category strategy for a $525M consumables portfolio (+24% YoY).
- Mentored 15 strategic account managers to $1B+ in sales; promoted 4 to senior roles.

Director of Retail Sales, National Chains (2020 - 2022)
- Delivered 23% YoY growth across omnichannel accounts through joint business planning.

EDUCATION
MBA, Kellogg School of Management
BA Organizational Leadership, Arizona State University

TECHNICAL SKILLS
Python, SQL, Tableau, Power BI, Excel, JIRA, Confluence, CRM systems, Agile"#;

pub struct CriteriaStore {
    current: RwLock<SearchCriteria>,
}

impl CriteriaStore {
    pub fn new() -> Self {
        Self::with_criteria(SearchCriteria {
            job_title: String::new(),
            location: String::new(),
            is_remote: true,
            resume_text: DEFAULT_RESUME.to_string(),
        })
    }

    pub fn with_criteria(criteria: SearchCriteria) -> Self {
        Self {
            current: RwLock::new(criteria),
        }
    }

    pub fn get(&self) -> SearchCriteria {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set(&self, criteria: SearchCriteria) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = criteria;
    }
}

impl Default for CriteriaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_search_remote_with_sample_resume() {
        let criteria = CriteriaStore::new().get();
        assert!(criteria.is_remote);
        assert!(criteria.job_title.is_empty());
        assert!(criteria.location.is_empty());
        assert_eq!(criteria.resume_text, DEFAULT_RESUME);
    }

    #[test]
    fn test_set_replaces_criteria() {
        let store = CriteriaStore::new();
        store.set(SearchCriteria {
            job_title: "Product Manager".to_string(),
            location: "Denver, CO".to_string(),
            is_remote: false,
            resume_text: "short".to_string(),
        });
        let criteria = store.get();
        assert_eq!(criteria.job_title, "Product Manager");
        assert!(!criteria.is_remote);
    }
}
