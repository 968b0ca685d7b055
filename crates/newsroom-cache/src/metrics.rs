//! In-process cache metrics (spec §4.1 metrics contract; supplemented per
//! SPEC_FULL.md §B.1 from `backend/app/cache/cache_metrics.py`). Every
//! `needs_scraping` call emits exactly one hit/miss observation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::reason::CacheDecisionReason;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheMetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub by_reason: BTreeMap<String, u64>,
}

#[derive(Default)]
pub struct CacheMetrics {
    inner: Mutex<CacheMetricsSnapshot>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, should_scrape: bool, reason: CacheDecisionReason) {
        let mut snap = self.inner.lock().expect("cache metrics lock poisoned");
        if should_scrape {
            snap.misses += 1;
        } else {
            snap.hits += 1;
        }
        *snap.by_reason.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.lock().expect("cache metrics lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_hit_and_miss_by_reason() {
        let metrics = CacheMetrics::new();
        metrics.record(false, CacheDecisionReason::NotModified304);
        metrics.record(true, CacheDecisionReason::TtlExpired);
        let snap = metrics.snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.by_reason["not_modified_304"], 1);
        assert_eq!(snap.by_reason["ttl_expired"], 1);
    }
}
