//! Read-only view over the relational/KV stores the pipeline writes to.
//! Deliberately narrower than `newsroom_core::deps::PipelineDeps` — this
//! crate never touches the scraper/embedder/LLM capabilities, only the
//! five repositories L5 reads from (spec §6).

use std::sync::Arc;

use newsroom_core::repo::{
    IndicatorDefinitionRepo, IndicatorEventRepo, IndicatorValueRepo, KvCache, SourceReputationRepo,
};

#[derive(Clone)]
pub struct ApiState {
    pub indicator_definitions: Arc<dyn IndicatorDefinitionRepo>,
    pub indicator_values: Arc<dyn IndicatorValueRepo>,
    pub indicator_events: Arc<dyn IndicatorEventRepo>,
    pub source_reputation: Arc<dyn SourceReputationRepo>,
    pub kv: Arc<dyn KvCache>,
}

impl ApiState {
    pub fn new(
        indicator_definitions: Arc<dyn IndicatorDefinitionRepo>,
        indicator_values: Arc<dyn IndicatorValueRepo>,
        indicator_events: Arc<dyn IndicatorEventRepo>,
        source_reputation: Arc<dyn SourceReputationRepo>,
        kv: Arc<dyn KvCache>,
    ) -> Self {
        Self { indicator_definitions, indicator_values, indicator_events, source_reputation, kv }
    }
}
