//! `PipelineRuntime`: builds every layer's configured singleton once from
//! a [`PipelineDeps`] bundle and holds them for the lifetime of the
//! process, following the teacher workspace's `ServerDeps`-plus-singletons
//! startup shape. Construction is the one place this crate is allowed to
//! know every concrete type; everything downstream only sees the stage
//! structs and the capability/repo traits.

use std::sync::Arc;
use std::time::Duration;

use newsroom_cache::{CacheMetrics, HttpChangeDetector, SmartCache};
use newsroom_core::deps::PipelineDeps;
use newsroom_dedup::SemanticDeduplicator;
use newsroom_enrichment::EnrichmentPipeline;
use newsroom_impact::{BusinessImpactScorer, ImpactError};
use newsroom_indicators::IndicatorAggregator;
use newsroom_insights::{noop_enhancer, CompanyProfile, InsightEngine};
use newsroom_learning::{FeedbackLoop, LearningOrchestrator, MetricsTracker};
use newsroom_validation::CorroborationEngine;
use tracing::info;

use crate::concurrency::ConcurrencyLimiter;
use crate::error::PipelineRunError;
use crate::stages::{EnrichStage, IndicatorStage, IngestStage, InsightStage};

const CORROBORATION_WINDOW_HOURS: i64 = 48;
const INDICATOR_WINDOW_CAPACITY: usize = 2_000;
const CHANGE_DETECTOR_TIMEOUT_SECONDS: u64 = 10;

pub struct PipelineRuntime {
    pub deps: PipelineDeps,
    pub ingest: IngestStage,
    pub enrich: EnrichStage,
    pub indicators: IndicatorStage,
    pub insights: InsightStage,
    pub concurrency: Arc<ConcurrencyLimiter>,
    pub feedback: Arc<FeedbackLoop>,
    pub metrics: Arc<MetricsTracker>,
    pub learning: Arc<LearningOrchestrator>,
    pub companies: Vec<CompanyProfile>,
}

impl PipelineRuntime {
    /// Builds every singleton from `deps` and the set of indicator
    /// definitions currently marked active (spec §4.6: "one value per
    /// active definition per run"). `companies` is the portfolio L4 runs
    /// insight generation over; it has no persisted repository of its own
    /// in the retrieved corpus (spec §4.7 models it as run input).
    pub async fn init(deps: PipelineDeps, companies: Vec<CompanyProfile>) -> Result<Self, PipelineRunError> {
        deps.config.log_summary();

        let cache_metrics = Arc::new(CacheMetrics::new());
        let detector = Arc::new(HttpChangeDetector::new(Duration::from_secs(CHANGE_DETECTOR_TIMEOUT_SECONDS)));
        let source_ttls = deps.config.source_ttls.clone();
        let cache = Arc::new(SmartCache::new(
            deps.kv.clone(),
            detector,
            cache_metrics,
            move |source_type| source_ttls.for_type(source_type),
        ));

        let dedup = Arc::new(SemanticDeduplicator::new(deps.embedder.clone(), deps.config.dedup.clone()));
        let corroboration = Arc::new(CorroborationEngine::new(CORROBORATION_WINDOW_HOURS));
        let enrichment = EnrichmentPipeline::new();
        let impact = Arc::new(
            BusinessImpactScorer::new(deps.config.scoring_profile)
                .map_err(|e: ImpactError| PipelineRunError::Repository(e.to_string()))?,
        );

        let metrics = Arc::new(MetricsTracker::new());
        let feedback = Arc::new(FeedbackLoop::new(Some(metrics.clone())));
        let learning = Arc::new(LearningOrchestrator::new(metrics.clone(), feedback.clone(), deps.source_reputation.clone()));

        let definitions = deps
            .indicator_definitions
            .list_active()
            .await
            .map_err(|e| PipelineRunError::Repository(e.to_string()))?;
        let indicator_ids = definitions.iter().map(|d| d.indicator_id.clone()).collect();
        let aggregator = Arc::new(IndicatorAggregator::new(definitions));

        let insight_engine = Arc::new(InsightEngine::new());
        let concurrency = Arc::new(ConcurrencyLimiter::new(deps.config.per_source_concurrency));

        let ingest = IngestStage::new(
            deps.scraper.clone(),
            cache,
            dedup,
            deps.source_reputation.clone(),
            feedback.clone(),
            concurrency.clone(),
        );
        let enrich = EnrichStage::new(
            corroboration,
            enrichment,
            impact,
            deps.source_reputation.clone(),
            deps.documents.clone(),
            feedback.clone(),
        );
        let indicators = IndicatorStage::new(aggregator, deps.indicator_values.clone(), deps.indicator_events.clone(), INDICATOR_WINDOW_CAPACITY);
        let insights = InsightStage::new(
            insight_engine,
            deps.indicator_values.clone(),
            deps.business_insights.clone(),
            deps.documents.clone(),
            deps.kv.clone(),
            Arc::new(noop_enhancer()),
            indicator_ids,
        );

        info!(company_count = companies.len(), "pipeline runtime initialized");

        Ok(Self { deps, ingest, enrich, indicators, insights, concurrency, feedback, metrics, learning, companies })
    }

    /// Starts the background learning-cycle loop. Callers hold the
    /// returned handle and the `cancellation` token together so shutdown
    /// can join it (spec §5 cooperative shutdown).
    pub fn spawn_learning_cycle(
        &self,
        cancellation: newsroom_core::cancel::CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        self.learning.clone().spawn(cancellation, self.deps.config.learning.cycle_interval_seconds)
    }
}
