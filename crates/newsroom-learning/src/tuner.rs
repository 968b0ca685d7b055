//! Auto-tuner (spec §4.8): periodically adjusts per-source concurrency,
//! quality thresholds, and (indirectly, via the returned parameters) the
//! timeout/retry knobs named in spec §5, based on observed hit/miss and
//! downstream-acceptance rates. Grounded on
//! `scripts/test_adaptive_learning.py`'s `get_optimal_parameters`
//! call-site (`timeout_ms`, `max_retries`, `retry_delay_ms`,
//! `concurrency`, `quality_threshold`); no `auto_tuner.py` source was
//! retrieved, so the tuning rules themselves are authored from spec §5's
//! named defaults and §4.8's "based on observed hit/miss rates and
//! downstream acceptance" wording.

use serde::Serialize;

use crate::feedback::FeedbackAggregation;
use crate::metrics::SourceMetrics;

pub const DEFAULT_CONCURRENCY: u8 = 5;
pub const MIN_CONCURRENCY: u8 = 1;
pub const MAX_CONCURRENCY: u8 = 10;
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u8 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, Serialize)]
pub struct TunedParameters {
    pub source_id: String,
    pub concurrency: u8,
    pub quality_threshold: f64,
    pub timeout_ms: u64,
    pub max_retries: u8,
    pub retry_delay_ms: u64,
}

#[derive(Default)]
pub struct AutoTuner;

impl AutoTuner {
    pub fn new() -> Self {
        Self
    }

    /// A reliable, well-accepted source earns more concurrency and a
    /// relaxed quality bar; a source with poor scrape success or low
    /// downstream acceptance is throttled and held to a stricter bar.
    pub fn tune(
        &self,
        source_id: &str,
        metrics: &SourceMetrics,
        feedback: Option<&FeedbackAggregation>,
    ) -> TunedParameters {
        let success_rate = if metrics.scrapes_attempted == 0 { 0.5 } else { metrics.scrape_success_rate() };
        let acceptance_rate = metrics.downstream_acceptance_rate();
        let overall_score = feedback.map(|f| f.overall_score()).unwrap_or(0.5);

        let health = (success_rate + acceptance_rate + overall_score) / 3.0;

        let concurrency = if health >= 0.85 {
            MAX_CONCURRENCY
        } else if health >= 0.65 {
            DEFAULT_CONCURRENCY + 2
        } else if health >= 0.4 {
            DEFAULT_CONCURRENCY
        } else if health >= 0.2 {
            DEFAULT_CONCURRENCY / 2
        } else {
            MIN_CONCURRENCY
        }
        .clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);

        let quality_threshold = (DEFAULT_QUALITY_THRESHOLD + (0.5 - health) * 0.3).clamp(0.3, 0.8);

        let max_retries = if success_rate < 0.5 { DEFAULT_MAX_RETRIES + 2 } else { DEFAULT_MAX_RETRIES };
        let retry_delay_ms = if success_rate < 0.5 { DEFAULT_RETRY_DELAY_MS * 2 } else { DEFAULT_RETRY_DELAY_MS };

        TunedParameters {
            source_id: source_id.to_string(),
            concurrency,
            quality_threshold,
            timeout_ms: DEFAULT_NETWORK_TIMEOUT_MS,
            max_retries,
            retry_delay_ms,
        }
    }
}
