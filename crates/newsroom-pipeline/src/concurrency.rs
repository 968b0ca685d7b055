//! Per-source concurrency permits (spec §5: "within a layer, items are
//! parallelised up to a per-source `concurrency` parameter"). Grounded on
//! `rootsignal-scout`'s `ChromeScraper` holding a `tokio::sync::Semaphore`
//! sized to its concurrency cap; generalised here to one semaphore per
//! source, re-sizable at runtime as the auto-tuner adjusts a source's
//! `TunedParameters::concurrency`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, Semaphore};

pub struct ConcurrencyLimiter {
    default_permits: usize,
    per_source: RwLock<HashMap<String, Arc<Semaphore>>>,
}

impl ConcurrencyLimiter {
    pub fn new(default_permits: usize) -> Self {
        Self { default_permits: default_permits.max(1), per_source: RwLock::new(HashMap::new()) }
    }

    async fn semaphore_for(&self, source_id: &str) -> Arc<Semaphore> {
        if let Some(sem) = self.per_source.read().await.get(source_id) {
            return sem.clone();
        }
        let mut guard = self.per_source.write().await;
        guard.entry(source_id.to_string()).or_insert_with(|| Arc::new(Semaphore::new(self.default_permits))).clone()
    }

    /// Acquires one concurrency permit for `source_id`, creating its
    /// semaphore lazily at the default width on first use.
    pub async fn acquire(&self, source_id: &str) -> tokio::sync::OwnedSemaphorePermit {
        let sem = self.semaphore_for(source_id).await;
        sem.acquire_owned().await.expect("semaphore never closed")
    }

    /// Re-sizes a source's permit pool (e.g. from the auto-tuner's
    /// `TunedParameters::concurrency`). Replaces the semaphore outright —
    /// in-flight permits from the old one remain valid until released.
    pub async fn retune(&self, source_id: &str, concurrency: usize) {
        let mut guard = self.per_source.write().await;
        guard.insert(source_id.to_string(), Arc::new(Semaphore::new(concurrency.max(1))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_up_to_default_width() {
        let limiter = ConcurrencyLimiter::new(2);
        let _p1 = limiter.acquire("src-1").await;
        let _p2 = limiter.acquire("src-1").await;
        assert_eq!(limiter.semaphore_for("src-1").await.available_permits(), 0);
    }

    #[tokio::test]
    async fn retune_replaces_permit_width() {
        let limiter = ConcurrencyLimiter::new(5);
        limiter.retune("src-1", 1).await;
        assert_eq!(limiter.semaphore_for("src-1").await.available_permits(), 1);
    }

    #[tokio::test]
    async fn distinct_sources_have_independent_semaphores() {
        let limiter = ConcurrencyLimiter::new(1);
        let _p1 = limiter.acquire("src-1").await;
        let _p2 = limiter.acquire("src-2").await;
        assert_eq!(limiter.semaphore_for("src-1").await.available_permits(), 0);
        assert_eq!(limiter.semaphore_for("src-2").await.available_permits(), 0);
    }
}
