//! L4 business insight generation (spec §4.7): per-company periodic run
//! over the indicator history L3 has accumulated, producing risks,
//! opportunities, narratives and a portfolio roll-up, persisted across the
//! document store, relational insight tables, and a short-TTL cache bundle
//! for L5 reads.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use newsroom_common::{IndicatorId, TrendDirection};
use newsroom_core::repo::{BusinessInsightRepo, DocumentStore, IndicatorValueRepo, KvCache};
use newsroom_indicators::detect_trend;
use newsroom_insights::{CompanyProfile, InsightEngine, InsightRunSummary, NarrativeEnhancer};
use tracing::{info, warn};

use crate::error::PipelineRunError;

const TREND_WINDOW_DAYS: u32 = 30;
const INSIGHT_CACHE_TTL_SECONDS: u64 = 900;

pub struct InsightStage {
    engine: Arc<InsightEngine>,
    value_repo: Arc<dyn IndicatorValueRepo>,
    insight_repo: Arc<dyn BusinessInsightRepo>,
    documents: Arc<dyn DocumentStore>,
    cache: Arc<dyn KvCache>,
    enhancer: Arc<dyn NarrativeEnhancer>,
    indicator_ids: Vec<IndicatorId>,
}

impl InsightStage {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: Arc<InsightEngine>,
        value_repo: Arc<dyn IndicatorValueRepo>,
        insight_repo: Arc<dyn BusinessInsightRepo>,
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn KvCache>,
        enhancer: Arc<dyn NarrativeEnhancer>,
        indicator_ids: Vec<IndicatorId>,
    ) -> Self {
        Self { engine, value_repo, insight_repo, documents, cache, enhancer, indicator_ids }
    }

    async fn load_indicator_state(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(BTreeMap<IndicatorId, f64>, BTreeMap<IndicatorId, TrendDirection>), PipelineRunError> {
        let mut indicator_values = BTreeMap::new();
        let mut trend_directions = BTreeMap::new();
        let window_start = now - chrono::Duration::days(TREND_WINDOW_DAYS as i64);

        for indicator_id in &self.indicator_ids {
            if let Some(latest) =
                self.value_repo.latest(indicator_id).await.map_err(|e| PipelineRunError::Repository(e.to_string()))?
            {
                indicator_values.insert(indicator_id.clone(), latest.value);
            }

            let history = self
                .value_repo
                .range(indicator_id, window_start, now)
                .await
                .map_err(|e| PipelineRunError::Repository(e.to_string()))?;
            if history.len() < 2 {
                continue;
            }
            let timestamps: Vec<DateTime<Utc>> = history.iter().map(|v| v.timestamp).collect();
            let values: Vec<f64> = history.iter().map(|v| v.value).collect();
            match detect_trend(indicator_id, TREND_WINDOW_DAYS, &timestamps, &values) {
                Ok(trend) => {
                    trend_directions.insert(indicator_id.clone(), trend.direction);
                }
                Err(err) => warn!(indicator_id = %indicator_id, error = %err, "trend detection skipped"),
            }
        }

        Ok((indicator_values, trend_directions))
    }

    /// Runs one company through detection, narrative, and persistence.
    /// A company with no indicator data this window is skipped, not an
    /// error (spec §5 degrade-never-fail for a single run-unit's absence).
    pub async fn run_for_company(
        &self,
        company: &CompanyProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<InsightRunSummary>, PipelineRunError> {
        let (indicator_values, trend_directions) = self.load_indicator_state(now).await?;
        if indicator_values.is_empty() {
            warn!(company_id = %company.company_id, "no indicator data available, skipping insight run");
            return Ok(None);
        }

        let summary = match self
            .engine
            .produce_insights(company, &indicator_values, &trend_directions, self.enhancer.as_ref())
            .await
        {
            Ok(summary) => summary,
            Err(err) => {
                warn!(company_id = %company.company_id, error = %err, "insight generation failed");
                return Ok(None);
            }
        };

        for risk_insight in &summary.risks {
            self.insight_repo
                .save_risk(&risk_insight.risk)
                .await
                .map_err(|e| PipelineRunError::Repository(e.to_string()))?;
            self.persist_reasoning(&company.company_id, &risk_insight.risk.code, &risk_insight.risk.reasoning).await;
        }
        for opportunity_insight in &summary.opportunities {
            self.insight_repo
                .save_opportunity(&opportunity_insight.opportunity)
                .await
                .map_err(|e| PipelineRunError::Repository(e.to_string()))?;
            self.persist_reasoning(&company.company_id, &opportunity_insight.opportunity.code, &opportunity_insight.opportunity.reasoning).await;
        }

        self.cache_bundle(&company.company_id, &summary).await;

        info!(
            company_id = %company.company_id,
            risk_count = summary.risks.len(),
            opportunity_count = summary.opportunities.len(),
            "insight run persisted"
        );

        Ok(Some(summary))
    }

    async fn persist_reasoning(&self, company_id: &str, code: &str, reasoning: &str) {
        let key = format!("insight:{company_id}:{code}:reasoning");
        if let Err(err) = self.documents.put(&key, serde_json::json!({ "reasoning": reasoning })).await {
            warn!(company_id, code, error = %err, "failed to persist insight reasoning");
        }
    }

    async fn cache_bundle(&self, company_id: &str, summary: &InsightRunSummary) {
        let bundle = serde_json::json!({
            "company_id": summary.company_id,
            "risks": summary.risks.iter().map(|r| serde_json::json!({
                "risk": r.risk,
                "narrative": r.narrative,
                "recommendations": r.recommendations,
            })).collect::<Vec<_>>(),
            "opportunities": summary.opportunities.iter().map(|o| serde_json::json!({
                "opportunity": o.opportunity,
                "narrative": o.narrative,
                "recommendations": o.recommendations,
            })).collect::<Vec<_>>(),
            "portfolio": summary.portfolio,
            "top_priority_risk_codes": summary.top_priority_risk_codes,
            "top_priority_opportunity_codes": summary.top_priority_opportunity_codes,
        });
        let Ok(bytes) = serde_json::to_vec(&bundle) else {
            warn!(company_id, "failed to serialize insight bundle for cache");
            return;
        };
        if let Err(err) = self.cache.set(&format!("insights:{company_id}"), bytes, INSIGHT_CACHE_TTL_SECONDS).await {
            warn!(company_id, error = %err, "failed to cache insight bundle");
        }
    }
}
