//! L1 ingestion & quality (spec §4.1/§4.2): cache-gated scrape, structural
//! filtering, and semantic dedup, feeding accepted `RawArticle`s into L2.
//! Grounded on `rootsignal-scout`'s `ScrapePipeline` phase-bundling shape
//! (§ — one struct holding shared deps, one async method per phase).

use std::sync::Arc;
use std::time::Duration;

use newsroom_cache::SmartCache;
use newsroom_common::{RawArticle, Severity, SourceReputation, SourceTier};
use newsroom_core::capability::Scraper;
use newsroom_core::cancel::CancellationToken;
use newsroom_core::repo::SourceReputationRepo;
use newsroom_dedup::{classify, DuplicateType, SemanticDeduplicator};
use newsroom_learning::FeedbackLoop;
use newsroom_validation::record_contradiction;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::concurrency::ConcurrencyLimiter;
use crate::error::PipelineRunError;
use crate::retry::retry_with_backoff;
use crate::source::SourceDescriptor;

const LAYER: &str = "L1";

pub struct IngestStage {
    scraper: Arc<dyn Scraper>,
    cache: Arc<SmartCache>,
    dedup: Arc<SemanticDeduplicator>,
    reputation_repo: Arc<dyn SourceReputationRepo>,
    feedback: Arc<FeedbackLoop>,
    concurrency: Arc<ConcurrencyLimiter>,
}

impl IngestStage {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        scraper: Arc<dyn Scraper>,
        cache: Arc<SmartCache>,
        dedup: Arc<SemanticDeduplicator>,
        reputation_repo: Arc<dyn SourceReputationRepo>,
        feedback: Arc<FeedbackLoop>,
        concurrency: Arc<ConcurrencyLimiter>,
    ) -> Self {
        Self { scraper, cache, dedup, reputation_repo, feedback, concurrency }
    }

    async fn reputation_or_default(&self, source: &SourceDescriptor) -> Result<SourceReputation, PipelineRunError> {
        match self.reputation_repo.get(&source.source_id).await.map_err(|e| PipelineRunError::Repository(e.to_string()))? {
            Some(rep) => Ok(rep),
            None => {
                let rep = SourceReputation::new(source.source_id.clone(), source.tier, chrono::Utc::now());
                self.reputation_repo.upsert(&rep).await.map_err(|e| PipelineRunError::Repository(e.to_string()))?;
                Ok(rep)
            }
        }
    }

    async fn penalize_scrape_failure(&self, source: &SourceDescriptor) {
        let Ok(Some(mut rep)) = self.reputation_repo.get(&source.source_id).await else { return };
        record_contradiction(&mut rep, 1);
        if let Err(err) = self.reputation_repo.upsert(&rep).await {
            warn!(source_id = %source.source_id, error = %err, "failed to persist reputation penalty");
        }
    }

    /// Runs one source through cache-gated fetch, structural filtering,
    /// and dedup, sending accepted articles to `out`. Returns the count
    /// forwarded to L2. A source's total scrape failure (after retries)
    /// is reported, never propagated as a run-ending error (spec §5).
    pub async fn run_source(
        &self,
        source: &SourceDescriptor,
        force: bool,
        max_retries: u8,
        retry_base: Duration,
        cancellation: &CancellationToken,
        out: &mpsc::Sender<RawArticle>,
    ) -> Result<usize, PipelineRunError> {
        if cancellation.is_cancelled() {
            return Err(PipelineRunError::Cancelled(cancellation.reason().unwrap_or(newsroom_core::cancel::CancelReason::UserRequested)));
        }

        let decision = self.cache.needs_scraping(&source.source_id, &source.url, source.source_type, force).await;
        let articles = if !decision.should_scrape {
            self.cache.get_cached_articles(&source.source_id).await?
        } else {
            let _permit = self.concurrency.acquire(&source.source_id).await;
            let scraper = self.scraper.clone();
            let source_id = source.source_id.clone();
            let url = source.url.clone();
            let fetched = retry_with_backoff("scrape", max_retries, retry_base, || {
                let scraper = scraper.clone();
                let source_id = source_id.clone();
                let url = url.clone();
                async move { scraper.fetch(&source_id, &url).await }
            })
            .await;

            match fetched {
                Ok(articles) => {
                    if let Err(err) =
                        self.cache.cache_articles(&source.source_id, &source.url, source.source_type, &articles, None, None, "").await
                    {
                        warn!(source_id = %source.source_id, error = %err, "failed to persist cache entry after scrape");
                    }
                    articles
                }
                Err(err) => {
                    warn!(source_id = %source.source_id, error = %err, "scrape retries exhausted, penalizing source");
                    self.penalize_scrape_failure(source).await;
                    self.feedback.receive_feedback(
                        newsroom_common::FeedbackSignal::new(newsroom_common::FeedbackType::SourceReliableFalse, LAYER)
                            .with_source(source.source_id.clone())
                            .with_severity(Severity::High),
                    );
                    return Err(PipelineRunError::SourceExhausted(source.source_id.clone()));
                }
            }
        };

        let reputation = self.reputation_or_default(source).await?;
        let mut accepted = 0usize;
        for article in articles {
            if cancellation.is_cancelled() {
                break;
            }
            if article.title.trim().is_empty() || article.body.trim().is_empty() {
                self.feedback.receive_feedback(
                    newsroom_common::FeedbackSignal::new(newsroom_common::FeedbackType::ContentCorrupted, LAYER)
                        .with_article(article.article_id.clone())
                        .with_source(source.source_id.clone()),
                );
                continue;
            }

            let duplicate_type = match self
                .dedup
                .check_duplicate(
                    &article.article_id,
                    &article.title,
                    &article.body,
                    &article.url,
                    &source.source_id,
                    reputation.reputation_score,
                    article.scrape_timestamp,
                )
                .await
            {
                Ok(result) => result.duplicate_type,
                Err(err) => {
                    // DependencyUnavailable: dedup degrades to "treat as unique"
                    // rather than blocking ingestion (spec §7).
                    warn!(article_id = %article.article_id, error = %err, "dedup check failed, passing through as unique");
                    DuplicateType::Unique
                }
            };

            if matches!(duplicate_type, DuplicateType::ExactDuplicate | DuplicateType::NearDuplicate) {
                self.feedback.receive_feedback(
                    newsroom_common::FeedbackSignal::new(newsroom_common::FeedbackType::DuplicateConfirmed, LAYER)
                        .with_article(article.article_id.clone())
                        .with_source(source.source_id.clone()),
                );
                continue;
            }

            if out.send(article).await.is_err() {
                warn!(source_id = %source.source_id, "L2 queue closed, stopping ingestion early");
                break;
            }
            accepted += 1;
        }

        info!(source_id = %source.source_id, accepted, "ingest run complete");
        Ok(accepted)
    }
}

/// Classifies a raw similarity score against the configured dedup
/// thresholds; exposed for callers that already have a score (e.g.
/// re-checking a cluster member) rather than running `check_duplicate`.
pub fn classify_similarity(score: f64, config: &newsroom_common::config::DedupConfig) -> DuplicateType {
    classify(score, config)
}
