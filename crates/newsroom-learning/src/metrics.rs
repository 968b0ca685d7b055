//! MetricsTracker (spec §4.8): records scrape outcomes, validation
//! outcomes, and article downstream outcomes, grounded on
//! `newsroom-cache::metrics::CacheMetrics`'s `Mutex<Snapshot>` pattern.
//! No `metrics_tracker.py` source was retrieved; the three recorded
//! outcome kinds are read directly off spec §4.8's MetricsTracker
//! bullet.

use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SourceMetrics {
    pub scrapes_attempted: u64,
    pub scrapes_succeeded: u64,
    pub articles_scraped: u64,
    pub total_latency_ms: u64,
    pub error_counts: BTreeMap<String, u64>,
    pub validations_accepted: u64,
    pub validations_rejected: u64,
    pub downstream_accepted: u64,
    pub downstream_rejected: u64,
}

impl SourceMetrics {
    pub fn scrape_success_rate(&self) -> f64 {
        if self.scrapes_attempted == 0 {
            return 0.0;
        }
        self.scrapes_succeeded as f64 / self.scrapes_attempted as f64
    }

    pub fn average_latency_ms(&self) -> f64 {
        if self.scrapes_attempted == 0 {
            return 0.0;
        }
        self.total_latency_ms as f64 / self.scrapes_attempted as f64
    }

    pub fn downstream_acceptance_rate(&self) -> f64 {
        let total = self.downstream_accepted + self.downstream_rejected;
        if total == 0 {
            return 0.5;
        }
        self.downstream_accepted as f64 / total as f64
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub by_source: BTreeMap<String, SourceMetrics>,
}

#[derive(Default)]
pub struct MetricsTracker {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scrape_outcome(
        &self,
        source_id: &str,
        success: bool,
        article_count: u64,
        latency_ms: u64,
        error_type: Option<&str>,
    ) {
        let mut snap = self.inner.lock().expect("metrics tracker lock poisoned");
        let entry = snap.by_source.entry(source_id.to_string()).or_default();
        entry.scrapes_attempted += 1;
        entry.total_latency_ms += latency_ms;
        if success {
            entry.scrapes_succeeded += 1;
            entry.articles_scraped += article_count;
        } else if let Some(kind) = error_type {
            *entry.error_counts.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    pub fn record_validation_outcome(&self, source_id: &str, accepted: bool) {
        let mut snap = self.inner.lock().expect("metrics tracker lock poisoned");
        let entry = snap.by_source.entry(source_id.to_string()).or_default();
        if accepted {
            entry.validations_accepted += 1;
        } else {
            entry.validations_rejected += 1;
        }
    }

    /// Mirrors `feedback_loop.py`'s
    /// `metrics_tracker.record_downstream_feedback(article_id, source_id,
    /// accepted, layer, reason)` call — `article_id`/`layer`/`reason` are
    /// accepted for call-site parity with the Python original but the
    /// tracker only aggregates the acceptance count per source.
    pub fn record_downstream_outcome(&self, source_id: &str, accepted: bool) {
        let mut snap = self.inner.lock().expect("metrics tracker lock poisoned");
        let entry = snap.by_source.entry(source_id.to_string()).or_default();
        if accepted {
            entry.downstream_accepted += 1;
        } else {
            entry.downstream_rejected += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().expect("metrics tracker lock poisoned").clone()
    }

    pub fn source_metrics(&self, source_id: &str) -> Option<SourceMetrics> {
        self.inner.lock().expect("metrics tracker lock poisoned").by_source.get(source_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_success_rate_tracks_attempts() {
        let tracker = MetricsTracker::new();
        tracker.record_scrape_outcome("src-1", true, 5, 100, None);
        tracker.record_scrape_outcome("src-1", false, 0, 50, Some("timeout"));
        let metrics = tracker.source_metrics("src-1").unwrap();
        assert_eq!(metrics.scrapes_attempted, 2);
        assert_eq!(metrics.scrape_success_rate(), 0.5);
        assert_eq!(metrics.error_counts["timeout"], 1);
    }

    #[test]
    fn downstream_acceptance_rate_defaults_to_neutral_with_no_observations() {
        let tracker = MetricsTracker::new();
        let metrics = tracker.source_metrics("unknown").unwrap_or_default();
        assert_eq!(metrics.downstream_acceptance_rate(), 0.5);
    }

    #[test]
    fn downstream_outcomes_compute_acceptance_rate() {
        let tracker = MetricsTracker::new();
        tracker.record_downstream_outcome("src-1", true);
        tracker.record_downstream_outcome("src-1", true);
        tracker.record_downstream_outcome("src-1", false);
        let metrics = tracker.source_metrics("src-1").unwrap();
        assert!((metrics.downstream_acceptance_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }
}
