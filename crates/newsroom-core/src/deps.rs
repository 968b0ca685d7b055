use std::sync::Arc;

use newsroom_common::PipelineConfig;

use crate::capability::{Embedder, LlmClient, Scraper};
use crate::repo::{
    BusinessInsightRepo, DocumentStore, IndicatorDefinitionRepo, IndicatorEventRepo,
    IndicatorValueRepo, KvCache, SourceReputationRepo,
};

/// Central dependency container passed to every layer, following
/// `ServerDeps` in the teacher workspace. No global mutable state beyond
/// this struct and the configured singletons each layer builds on top of
/// it (spec §5, §9).
#[derive(Clone)]
pub struct PipelineDeps {
    pub config: PipelineConfig,
    pub scraper: Arc<dyn Scraper>,
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn LlmClient>,
    pub indicator_definitions: Arc<dyn IndicatorDefinitionRepo>,
    pub indicator_values: Arc<dyn IndicatorValueRepo>,
    pub indicator_events: Arc<dyn IndicatorEventRepo>,
    pub source_reputation: Arc<dyn SourceReputationRepo>,
    pub business_insights: Arc<dyn BusinessInsightRepo>,
    pub documents: Arc<dyn DocumentStore>,
    pub kv: Arc<dyn KvCache>,
}

impl PipelineDeps {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        scraper: Arc<dyn Scraper>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LlmClient>,
        indicator_definitions: Arc<dyn IndicatorDefinitionRepo>,
        indicator_values: Arc<dyn IndicatorValueRepo>,
        indicator_events: Arc<dyn IndicatorEventRepo>,
        source_reputation: Arc<dyn SourceReputationRepo>,
        business_insights: Arc<dyn BusinessInsightRepo>,
        documents: Arc<dyn DocumentStore>,
        kv: Arc<dyn KvCache>,
    ) -> Self {
        Self {
            config,
            scraper,
            embedder,
            llm,
            indicator_definitions,
            indicator_values,
            indicator_events,
            source_reputation,
            business_insights,
            documents,
            kv,
        }
    }
}
