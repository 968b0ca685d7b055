//! FeedbackLoop (spec §4.8), a direct port of `feedback_loop.py`'s
//! `FeedbackLoop`/`FeedbackAggregation`: buffers `FeedbackSignal`s per
//! source, aggregates usage/relevance/accuracy rates, and triggers a
//! reputation adjustment once a source's pending buffer reaches
//! `REPUTATION_UPDATE_THRESHOLD`.
//!
//! `newsroom_common::FeedbackType` has twenty variants named for this
//! pipeline's own domain (indicator matches, corroboration, risk/opportunity
//! confirmation) rather than `feedback_loop.py`'s topic/claim-centric
//! names. The bucket/polarity mapping in `classify` is therefore an Open
//! Question resolution, built to preserve the Python original's intent:
//! each variant is read as usage, relevance, or accuracy evidence (or
//! none of those, for quality/manual/reliability signals that are
//! tracked but excluded from `overall_score`), and independently as
//! positive/negative for the reputation-adjustment vote, mirroring
//! `_process_reputation_update`'s separate positive/negative signal list.

use std::collections::{BTreeMap, VecDeque};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use newsroom_common::{FeedbackSignal, FeedbackType};
use tracing::{debug, error, info, warn};

use crate::metrics::MetricsTracker;

/// One week: old enough that a source's score should re-earn trust
/// rather than carry a distant signal forever (no aggregation decay is
/// implemented — kept as a constant for documentation parity with
/// `feedback_loop.py::AGGREGATION_DECAY_HOURS`, since no caller currently
/// triggers an aggregation reset on this boundary).
pub const AGGREGATION_DECAY_HOURS: i64 = 168;
/// 30 days of raw signal history retained for `recent_signals`/`signal_counts`.
pub const SIGNAL_RETENTION_HOURS: i64 = 720;
/// Pending-signal buffer size per source that triggers a reputation update.
pub const REPUTATION_UPDATE_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Usage,
    Relevance,
    Accuracy,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Positive,
    Negative,
}

fn bucket(feedback_type: FeedbackType) -> Bucket {
    use FeedbackType::*;
    match feedback_type {
        ArticleUsed | ArticleDiscarded => Bucket::Usage,
        IndicatorMatchConfirmed | IndicatorMatchRejected | TopicMisclassified => Bucket::Relevance,
        CorroborationConfirmed
        | DuplicateConfirmed
        | RiskConfirmed
        | OpportunityConfirmed
        | SentimentMismatch
        | EntityMismatch
        | ForecastInaccurate
        | CorroborationContradicted
        | DuplicateRejected
        | RiskFalsePositive
        | OpportunityFalsePositive => Bucket::Accuracy,
        _ => Bucket::None,
    }
}

fn bucket_polarity(feedback_type: FeedbackType) -> Option<Polarity> {
    use FeedbackType::*;
    match feedback_type {
        ArticleUsed | IndicatorMatchConfirmed | CorroborationConfirmed | DuplicateConfirmed | RiskConfirmed
        | OpportunityConfirmed => Some(Polarity::Positive),
        ArticleDiscarded | IndicatorMatchRejected | TopicMisclassified | SentimentMismatch | EntityMismatch
        | ForecastInaccurate | CorroborationContradicted | DuplicateRejected | RiskFalsePositive
        | OpportunityFalsePositive => Some(Polarity::Negative),
        _ => None,
    }
}

/// Polarity for the reputation vote, which counts every buffered signal
/// (including quality/manual/reliability kinds `bucket` excludes from the
/// usage/relevance/accuracy rates) — ports `_process_reputation_update`'s
/// separate positive/negative list.
fn reputation_polarity(feedback_type: FeedbackType) -> Polarity {
    use FeedbackType::*;
    match feedback_type {
        ArticleUsed
        | IndicatorMatchConfirmed
        | CorroborationConfirmed
        | DuplicateConfirmed
        | RiskConfirmed
        | OpportunityConfirmed
        | SourceReliableTrue
        | ManualAnnotation => Polarity::Positive,
        _ => Polarity::Negative,
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FeedbackAggregation {
    pub source_id: String,
    pub usage_positive: u64,
    pub usage_negative: u64,
    pub relevance_positive: u64,
    pub relevance_negative: u64,
    pub accuracy_positive: u64,
    pub accuracy_negative: u64,
    pub quality_issues: u64,
    pub feedback_count: u64,
    pub last_feedback: Option<DateTime<Utc>>,
}

impl FeedbackAggregation {
    pub fn usage_rate(&self) -> f64 {
        rate(self.usage_positive, self.usage_negative)
    }

    pub fn relevance_rate(&self) -> f64 {
        rate(self.relevance_positive, self.relevance_negative)
    }

    pub fn accuracy_rate(&self) -> f64 {
        rate(self.accuracy_positive, self.accuracy_negative)
    }

    /// `0.4 × usage + 0.3 × relevance + 0.3 × accuracy` (spec §4.8).
    pub fn overall_score(&self) -> f64 {
        0.4 * self.usage_rate() + 0.3 * self.relevance_rate() + 0.3 * self.accuracy_rate()
    }
}

fn rate(positive: u64, negative: u64) -> f64 {
    let total = positive + negative;
    if total == 0 {
        0.5
    } else {
        positive as f64 / total as f64
    }
}

struct State {
    signals: VecDeque<FeedbackSignal>,
    aggregations: BTreeMap<String, FeedbackAggregation>,
    pending: BTreeMap<String, Vec<FeedbackSignal>>,
}

/// Outcome of a `receive_feedback` call that crossed the reputation
/// buffer threshold — the caller applies the adjustment, since
/// `newsroom-validation::reputation` writes must be serialized per
/// source (spec §5) and this crate holds no reputation store itself.
pub struct ReputationAdjustment {
    pub source_id: String,
    pub delta: f64,
    pub positive_signals: usize,
    pub negative_signals: usize,
}

pub struct FeedbackLoop {
    state: RwLock<State>,
    metrics_tracker: Option<std::sync::Arc<MetricsTracker>>,
    handlers: RwLock<BTreeMap<String, Vec<Box<dyn Fn(&FeedbackSignal) + Send + Sync>>>>,
}

impl FeedbackLoop {
    pub fn new(metrics_tracker: Option<std::sync::Arc<MetricsTracker>>) -> Self {
        info!("FeedbackLoop initialized");
        Self {
            state: RwLock::new(State { signals: VecDeque::new(), aggregations: BTreeMap::new(), pending: BTreeMap::new() }),
            metrics_tracker,
            handlers: RwLock::new(BTreeMap::new()),
        }
    }

    fn handler_key(feedback_type: FeedbackType) -> String {
        format!("{feedback_type:?}")
    }

    /// Registers a handler for a feedback type. Handler panics/failures
    /// are caught at execution time and logged, never propagated — per
    /// spec §4.8, "learning must not break the main pipeline".
    pub fn register_handler(&self, feedback_type: FeedbackType, handler: Box<dyn Fn(&FeedbackSignal) + Send + Sync>) {
        let mut handlers = self.handlers.write().expect("feedback loop handlers lock poisoned");
        handlers.entry(Self::handler_key(feedback_type)).or_default().push(handler);
    }

    fn execute_handlers(&self, signal: &FeedbackSignal) {
        let handlers = self.handlers.read().expect("feedback loop handlers lock poisoned");
        if let Some(registered) = handlers.get(&Self::handler_key(signal.feedback_type)) {
            for handler in registered {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(signal)));
                if let Err(err) = result {
                    error!(feedback_type = ?signal.feedback_type, ?err, "feedback handler failed, swallowing");
                }
            }
        }
    }

    /// Processes one feedback signal: stores it, updates the source's
    /// aggregation, records it against the metrics tracker, runs
    /// registered handlers, and returns a pending reputation adjustment
    /// once the source's buffer has reached `REPUTATION_UPDATE_THRESHOLD`.
    pub fn receive_feedback(&self, signal: FeedbackSignal) -> Option<ReputationAdjustment> {
        let mut adjustment = None;
        {
            let mut state = self.state.write().expect("feedback loop state lock poisoned");
            state.signals.push_back(signal.clone());

            if let Some(source_id) = signal.source_id.clone() {
                update_aggregation(&mut state.aggregations, &source_id, &signal);

                let pending = state.pending.entry(source_id.clone()).or_default();
                pending.push(signal.clone());
                if pending.len() >= REPUTATION_UPDATE_THRESHOLD {
                    let batch = std::mem::take(pending);
                    adjustment = compute_adjustment(&source_id, &batch);
                }
            }

            trim_old_signals(&mut state.signals);
        }

        if let (Some(tracker), Some(source_id)) = (&self.metrics_tracker, &signal.source_id) {
            let accepted = bucket_polarity(signal.feedback_type) == Some(Polarity::Positive);
            tracker.record_downstream_outcome(source_id, accepted);
        }

        self.execute_handlers(&signal);
        debug!(feedback_type = ?signal.feedback_type, "processed feedback signal");
        adjustment
    }

    /// Batch variant; returns every reputation adjustment triggered along
    /// the way (a source can cross the threshold more than once).
    pub fn receive_batch_feedback(&self, signals: Vec<FeedbackSignal>) -> Vec<ReputationAdjustment> {
        let mut adjustments = Vec::new();
        let count = signals.len();
        for signal in signals {
            if let Some(adjustment) = self.receive_feedback(signal) {
                adjustments.push(adjustment);
            }
        }
        info!(count, "processed feedback batch");
        adjustments
    }

    pub fn source_feedback(&self, source_id: &str) -> Option<FeedbackAggregation> {
        self.state.read().expect("feedback loop state lock poisoned").aggregations.get(source_id).cloned()
    }

    pub fn all_aggregations(&self) -> BTreeMap<String, FeedbackAggregation> {
        self.state.read().expect("feedback loop state lock poisoned").aggregations.clone()
    }

    pub fn low_performing_sources(&self, threshold: f64, limit: usize) -> Vec<FeedbackAggregation> {
        let state = self.state.read().expect("feedback loop state lock poisoned");
        let mut low: Vec<FeedbackAggregation> = state
            .aggregations
            .values()
            .filter(|agg| agg.overall_score() < threshold && agg.feedback_count >= 5)
            .cloned()
            .collect();
        low.sort_by(|a, b| a.overall_score().partial_cmp(&b.overall_score()).unwrap());
        low.truncate(limit);
        low
    }

    pub fn high_performing_sources(&self, threshold: f64, limit: usize) -> Vec<FeedbackAggregation> {
        let state = self.state.read().expect("feedback loop state lock poisoned");
        let mut high: Vec<FeedbackAggregation> = state
            .aggregations
            .values()
            .filter(|agg| agg.overall_score() >= threshold && agg.feedback_count >= 5)
            .cloned()
            .collect();
        high.sort_by(|a, b| b.overall_score().partial_cmp(&a.overall_score()).unwrap());
        high.truncate(limit);
        high
    }

    pub fn recent_signals(&self, source_id: Option<&str>, hours: i64, limit: usize) -> Vec<FeedbackSignal> {
        let state = self.state.read().expect("feedback loop state lock poisoned");
        let cutoff = Utc::now() - Duration::hours(hours);
        let mut filtered: Vec<FeedbackSignal> = state
            .signals
            .iter()
            .filter(|s| s.timestamp >= cutoff)
            .filter(|s| match source_id {
                Some(id) => s.source_id.as_deref() == Some(id),
                None => true,
            })
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        filtered.truncate(limit);
        filtered
    }
}

fn update_aggregation(aggregations: &mut BTreeMap<String, FeedbackAggregation>, source_id: &str, signal: &FeedbackSignal) {
    let agg = aggregations.entry(source_id.to_string()).or_insert_with(|| FeedbackAggregation {
        source_id: source_id.to_string(),
        ..Default::default()
    });
    agg.last_feedback = Some(signal.timestamp);
    agg.feedback_count += 1;

    match (bucket(signal.feedback_type), bucket_polarity(signal.feedback_type)) {
        (Bucket::Usage, Some(Polarity::Positive)) => agg.usage_positive += 1,
        (Bucket::Usage, Some(Polarity::Negative)) => agg.usage_negative += 1,
        (Bucket::Relevance, Some(Polarity::Positive)) => agg.relevance_positive += 1,
        (Bucket::Relevance, Some(Polarity::Negative)) => agg.relevance_negative += 1,
        (Bucket::Accuracy, Some(Polarity::Positive)) => agg.accuracy_positive += 1,
        (Bucket::Accuracy, Some(Polarity::Negative)) => agg.accuracy_negative += 1,
        _ => {
            if matches!(
                signal.feedback_type,
                FeedbackType::ArticleDiscardedLowQuality | FeedbackType::ContentCorrupted
            ) {
                agg.quality_issues += 1;
            }
        }
    }
}

/// `(positive_ratio − 0.5) × 2 × 0.02`, capped at ±2% (spec §4.8).
fn compute_adjustment(source_id: &str, batch: &[FeedbackSignal]) -> Option<ReputationAdjustment> {
    if batch.is_empty() {
        return None;
    }
    let positive = batch.iter().filter(|s| reputation_polarity(s.feedback_type) == Polarity::Positive).count();
    let negative = batch.len() - positive;
    let ratio = positive as f64 / batch.len() as f64;
    let delta = ((ratio - 0.5) * 2.0 * 0.02).clamp(-0.02, 0.02);
    warn!(source_id, delta, positive, negative, "computed reputation adjustment from feedback buffer");
    Some(ReputationAdjustment { source_id: source_id.to_string(), delta, positive_signals: positive, negative_signals: negative })
}

fn trim_old_signals(signals: &mut VecDeque<FeedbackSignal>) {
    let cutoff = Utc::now() - Duration::hours(SIGNAL_RETENTION_HOURS);
    while let Some(front) = signals.front() {
        if front.timestamp < cutoff {
            signals.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(feedback_type: FeedbackType, source_id: &str) -> FeedbackSignal {
        FeedbackSignal::new(feedback_type, "layer2").with_source(source_id)
    }

    #[test]
    fn usage_rate_reflects_used_vs_discarded() {
        let loop_ = FeedbackLoop::new(None);
        loop_.receive_feedback(signal(FeedbackType::ArticleUsed, "src-1"));
        loop_.receive_feedback(signal(FeedbackType::ArticleUsed, "src-1"));
        loop_.receive_feedback(signal(FeedbackType::ArticleDiscarded, "src-1"));
        let agg = loop_.source_feedback("src-1").unwrap();
        assert!((agg.usage_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn tenth_signal_triggers_reputation_adjustment() {
        let loop_ = FeedbackLoop::new(None);
        let mut last = None;
        for _ in 0..9 {
            last = loop_.receive_feedback(signal(FeedbackType::ArticleUsed, "src-1"));
            assert!(last.is_none());
        }
        last = loop_.receive_feedback(signal(FeedbackType::ArticleUsed, "src-1"));
        let adjustment = last.unwrap();
        assert_eq!(adjustment.source_id, "src-1");
        assert!((adjustment.delta - 0.02).abs() < 1e-9);
    }

    #[test]
    fn mixed_batch_produces_proportional_delta() {
        let loop_ = FeedbackLoop::new(None);
        for _ in 0..5 {
            loop_.receive_feedback(signal(FeedbackType::ArticleUsed, "src-2"));
        }
        let mut last = None;
        for _ in 0..5 {
            last = loop_.receive_feedback(signal(FeedbackType::ArticleDiscarded, "src-2"));
        }
        let adjustment = last.unwrap();
        assert!((adjustment.delta - 0.0).abs() < 1e-9);
    }

    #[test]
    fn low_performing_sources_requires_minimum_observations() {
        let loop_ = FeedbackLoop::new(None);
        for _ in 0..4 {
            loop_.receive_feedback(signal(FeedbackType::ArticleDiscarded, "src-3"));
        }
        assert!(loop_.low_performing_sources(0.5, 10).is_empty());
        loop_.receive_feedback(signal(FeedbackType::ArticleDiscarded, "src-3"));
        assert_eq!(loop_.low_performing_sources(0.5, 10).len(), 1);
    }

    #[test]
    fn handler_panic_is_caught_and_does_not_propagate() {
        let loop_ = FeedbackLoop::new(None);
        loop_.register_handler(FeedbackType::ArticleUsed, Box::new(|_signal| panic!("boom")));
        loop_.receive_feedback(signal(FeedbackType::ArticleUsed, "src-4"));
    }
}
