use std::sync::Arc;

use crate::analysis::analyzer::{JobAnalyzer, LlmJobAnalyzer};
use crate::analysis::chat::ChatRegistry;
use crate::config::Config;
use crate::criteria::CriteriaStore;
use crate::llm_client::LlmClient;
use crate::scouting::enrichment::MockFinancialsProvider;
use crate::scouting::pipeline::PipelineContext;
use crate::scouting::session::Scout;
use crate::scouting::store::{InMemoryJobStore, JobStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub scout: Arc<Scout>,
    pub criteria: Arc<CriteriaStore>,
    /// `None` when no API key is configured. Tailoring and chat answer 503 then.
    pub llm: Option<LlmClient>,
    pub chats: Arc<ChatRegistry>,
}

impl AppState {
    /// Wires the in-memory store, mock enrichment and (if available) the LLM analyzer.
    pub fn new(config: &Config, llm: Option<LlmClient>) -> Self {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let analyzer = llm
            .clone()
            .map(|client| Arc::new(LlmJobAnalyzer(client)) as Arc<dyn JobAnalyzer>);

        let ctx = PipelineContext {
            store: Arc::clone(&store),
            financials: Arc::new(MockFinancialsProvider::new(config.scout.enrichment_latency)),
            analyzer,
            failure_policy: config.scout.failure_policy,
        };

        Self {
            scout: Arc::new(Scout::new(ctx, config.scout.clone())),
            store,
            criteria: Arc::new(CriteriaStore::new()),
            llm,
            chats: Arc::new(ChatRegistry::new()),
        }
    }
}
