//! L2 enrichment (spec §4.3/§4.4/§4.5): cross-source validation (claims,
//! corroboration, trust), business impact scoring, and classification/
//! sentiment/entity/quality enrichment, gating acceptance into L3.

use std::sync::Arc;

use chrono::Utc;
use newsroom_common::{EnrichedArticle, FeedbackSignal, FeedbackType, QualityBand, RawArticle, Severity, SourceReputation};
use newsroom_core::repo::{DocumentStore, SourceReputationRepo};
use newsroom_enrichment::EnrichmentPipeline;
use newsroom_impact::{BusinessImpactScorer, ScoreArticleInput};
use newsroom_learning::FeedbackLoop;
use newsroom_validation::{decide, record_confirmation, record_contradiction, Claim, ClaimExtractor, CorroborationEngine, TrustCalculator, ValidationVerdict};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::PipelineRunError;

const LAYER: &str = "L2";

pub struct EnrichStage {
    claims: ClaimExtractor,
    corroboration: Arc<CorroborationEngine>,
    enrichment: EnrichmentPipeline,
    impact: Arc<BusinessImpactScorer>,
    reputation_repo: Arc<dyn SourceReputationRepo>,
    documents: Arc<dyn DocumentStore>,
    feedback: Arc<FeedbackLoop>,
}

impl EnrichStage {
    pub fn new(
        corroboration: Arc<CorroborationEngine>,
        enrichment: EnrichmentPipeline,
        impact: Arc<BusinessImpactScorer>,
        reputation_repo: Arc<dyn SourceReputationRepo>,
        documents: Arc<dyn DocumentStore>,
        feedback: Arc<FeedbackLoop>,
    ) -> Self {
        Self { claims: ClaimExtractor::new(), corroboration, enrichment, impact, reputation_repo, documents, feedback }
    }

    async fn reputation(&self, source_id: &str) -> Result<SourceReputation, PipelineRunError> {
        self.reputation_repo
            .get(source_id)
            .await
            .map_err(|e| PipelineRunError::Repository(e.to_string()))?
            .ok_or_else(|| PipelineRunError::Repository(format!("no reputation record for {source_id}")))
    }

    /// Validates then enriches one article, forwarding it to L3 on
    /// acceptance. Rejections (quality or trust) are logged as feedback
    /// and the article is dropped from this run (spec §5 partial-failure
    /// semantics), never surfaced as a hard error.
    pub async fn process(&self, raw: RawArticle, out: &mpsc::Sender<EnrichedArticle>) -> Result<bool, PipelineRunError> {
        let now = Utc::now();
        let mut reputation = self.reputation(&raw.source_id).await?;
        let published_at = raw.publish_date.unwrap_or(raw.scrape_timestamp);

        let claims: Vec<Claim> = self.claims.extract(&format!("{} {}", raw.title, raw.body));
        let outcome = self.corroboration.corroborate(&raw.article_id, &raw.source_id, reputation.tier, &claims, now);
        let cross_validation =
            TrustCalculator::score(reputation.reputation_score, outcome.level, published_at, now, claims, Vec::new());
        let decision = decide(raw.article_id.clone(), cross_validation.score, cross_validation.trust_level, 0, now);

        match decision.verdict {
            ValidationVerdict::Rejected => {
                record_contradiction(&mut reputation, 1);
                self.reputation_repo.upsert(&reputation).await.map_err(|e| PipelineRunError::Repository(e.to_string()))?;
                self.feedback.receive_feedback(
                    FeedbackSignal::new(FeedbackType::ArticleDiscarded, LAYER)
                        .with_article(raw.article_id.clone())
                        .with_source(raw.source_id.clone())
                        .with_severity(Severity::Medium),
                );
                info!(article_id = %raw.article_id, reasons = ?decision.reasons, "article rejected at validation");
                return Ok(false);
            }
            ValidationVerdict::Accepted => {
                record_confirmation(&mut reputation, outcome.matching_article_ids.len(), outcome.matching_article_ids.is_empty());
                self.reputation_repo.upsert(&reputation).await.map_err(|e| PipelineRunError::Repository(e.to_string()))?;
            }
        }

        let impact = self.impact.score_article(
            ScoreArticleInput {
                title: &raw.title,
                content: &raw.body,
                source: &raw.source_id,
                published_at: Some(published_at),
                mention_count: (outcome.matching_article_ids.len() + 1) as u32,
                target_sectors: None,
            },
            now,
        );

        let enriched = self.enrichment.enrich(raw.clone(), Some(&reputation), now);

        if matches!(enriched.quality_band, QualityBand::Poor) {
            self.feedback.receive_feedback(
                FeedbackSignal::new(FeedbackType::ArticleDiscardedLowQuality, LAYER)
                    .with_article(raw.article_id.clone())
                    .with_source(raw.source_id.clone())
                    .with_quality(enriched.quality_score)
                    .with_severity(Severity::Low),
            );
            return Ok(false);
        }

        if let Err(err) = self
            .documents
            .put(&format!("article:{}:raw", raw.article_id), serde_json::to_value(&raw).unwrap_or_default())
            .await
        {
            warn!(article_id = %raw.article_id, error = %err, "failed to persist raw document");
        }
        if let Err(err) = self
            .documents
            .put(
                &format!("article:{}:enrichment", raw.article_id),
                serde_json::json!({
                    "pestel_category": enriched.pestel_category,
                    "quality_score": enriched.quality_score,
                    "impact_score": impact.impact_score,
                    "impact_level": format!("{:?}", impact.impact_level),
                    "priority_rank": impact.priority_rank,
                }),
            )
            .await
        {
            warn!(article_id = %raw.article_id, error = %err, "failed to persist enrichment document");
        }

        if out.send(enriched).await.is_err() {
            warn!(article_id = %raw.article_id, "L3 queue closed, dropping enriched article");
            return Ok(false);
        }

        Ok(true)
    }
}
