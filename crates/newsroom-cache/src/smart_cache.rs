//! The smart cache itself (spec §4.1): a four-level short-circuit check
//! that decides whether a source needs rescraping before any scraper
//! capability is invoked.
//!
//! Level 1 — TTL: an expired entry short-circuits straight to "scrape",
//! skipping every other check. A not-yet-expired entry is not trusted on
//! its own and still falls through to levels 2-4.
//! Level 2 — conditional HEAD: a `304` short-circuits without a body fetch.
//! Level 3 — content signature: compare a normalized byte-sample hash.
//! Level 4 — RSS-specialised: compare `lastBuildDate` / first `guid` / count.
//!
//! Any revalidation failure degrades to "scrape anyway" at reduced
//! confidence (spec §4.1: "never let cache error suppress ingestion").

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use newsroom_common::{CacheEntry, PipelineError, RawArticle, SourceType};
use newsroom_core::repo::KvCache;
use tracing::{debug, warn};

use crate::detector::ChangeDetector;
use crate::metrics::CacheMetrics;
use crate::normalize::content_signature;
use crate::reason::{CacheDecisionReason, ScrapeDecision};

fn entry_key(source_id: &str) -> String {
    format!("cache:entry:{source_id}")
}

fn articles_key(source_id: &str) -> String {
    format!("cache:articles:{source_id}")
}

pub struct SmartCache {
    kv: Arc<dyn KvCache>,
    detector: Arc<dyn ChangeDetector>,
    metrics: Arc<CacheMetrics>,
    ttl_seconds: Box<dyn Fn(SourceType) -> u64 + Send + Sync>,
}

impl SmartCache {
    pub fn new(
        kv: Arc<dyn KvCache>,
        detector: Arc<dyn ChangeDetector>,
        metrics: Arc<CacheMetrics>,
        ttl_seconds: impl Fn(SourceType) -> u64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            kv,
            detector,
            metrics,
            ttl_seconds: Box::new(ttl_seconds),
        }
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    async fn load_entry(&self, source_id: &str) -> Result<Option<CacheEntry>, PipelineError> {
        let raw = self
            .kv
            .get(&entry_key(source_id))
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        match raw {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| PipelineError::Storage(e.to_string())),
        }
    }

    fn emit(&self, decision: ScrapeDecision) -> ScrapeDecision {
        self.metrics.record(decision.should_scrape, decision.reason);
        decision
    }

    /// Decide whether `source_id` needs rescraping. `force` bypasses every
    /// level and always scrapes (spec §4.1: manual override).
    pub async fn needs_scraping(
        &self,
        source_id: &str,
        url: &str,
        source_type: SourceType,
        force: bool,
    ) -> ScrapeDecision {
        if force {
            return self.emit(ScrapeDecision::new(true, CacheDecisionReason::Forced, 1.0));
        }

        let entry = match self.load_entry(source_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                return self.emit(ScrapeDecision::new(
                    true,
                    CacheDecisionReason::NoCacheEntry,
                    1.0,
                ))
            }
            Err(err) => {
                warn!(%source_id, error = %err, "cache entry lookup failed, scraping anyway");
                return self.emit(ScrapeDecision::new(
                    true,
                    CacheDecisionReason::RevalidationError,
                    0.5,
                ));
            }
        };

        let now = Utc::now();
        if now >= entry.expires_at {
            debug!(%source_id, "ttl expired, scraping without further checks");
            return self.emit(ScrapeDecision::new(true, CacheDecisionReason::TtlExpired, 1.0));
        }

        if matches!(source_type, SourceType::News) && looks_like_feed(url) {
            return self.emit(self.revalidate_rss(url, &entry).await);
        }

        let head = self
            .detector
            .conditional_head(url, entry.etag.as_deref(), entry.last_modified.as_deref())
            .await;
        match head {
            Ok(head) if head.not_modified => {
                self.emit(ScrapeDecision::new(
                    false,
                    CacheDecisionReason::NotModified304,
                    0.95,
                ))
            }
            Ok(head) => {
                if head.etag.is_some() && head.etag != entry.etag
                    || head.last_modified.is_some() && head.last_modified != entry.last_modified
                {
                    return self.emit(ScrapeDecision::new(
                        true,
                        CacheDecisionReason::HeadersChanged,
                        0.85,
                    ));
                }
                self.emit(self.revalidate_content_signature(url, &entry).await)
            }
            Err(err) => {
                warn!(%source_id, error = %err, "revalidation request failed, scraping anyway");
                self.emit(ScrapeDecision::new(
                    true,
                    CacheDecisionReason::RevalidationError,
                    0.5,
                ))
            }
        }
    }

    async fn revalidate_content_signature(&self, url: &str, entry: &CacheEntry) -> ScrapeDecision {
        match self.detector.fetch_sample(url, 8192).await {
            Ok(sample) => {
                let signature = content_signature(&sample);
                if signature == entry.content_signature {
                    ScrapeDecision::new(false, CacheDecisionReason::ContentSignatureUnchanged, 0.8)
                } else {
                    ScrapeDecision::new(true, CacheDecisionReason::ContentSignatureChanged, 0.8)
                }
            }
            Err(err) => {
                warn!(url, error = %err, "content sample fetch failed, scraping anyway");
                ScrapeDecision::new(true, CacheDecisionReason::RevalidationError, 0.5)
            }
        }
    }

    async fn revalidate_rss(&self, url: &str, entry: &CacheEntry) -> ScrapeDecision {
        match self.detector.fetch_rss_meta(url).await {
            Ok(meta) => {
                let fingerprint = format!(
                    "{}|{}|{}",
                    meta.last_build_date.unwrap_or_default(),
                    meta.first_guid.unwrap_or_default(),
                    meta.item_count
                );
                let signature = content_signature(&fingerprint);
                if signature == entry.content_signature {
                    ScrapeDecision::new(false, CacheDecisionReason::RssUnchanged, 0.85)
                } else {
                    ScrapeDecision::new(true, CacheDecisionReason::RssChanged, 0.85)
                }
            }
            Err(err) => {
                warn!(url, error = %err, "rss revalidation failed, scraping anyway");
                ScrapeDecision::new(true, CacheDecisionReason::RevalidationError, 0.5)
            }
        }
    }

    /// Persist the outcome of a scrape so the next [`Self::needs_scraping`]
    /// call has something to revalidate against.
    pub async fn cache_articles(
        &self,
        source_id: &str,
        url: &str,
        source_type: SourceType,
        articles: &[RawArticle],
        etag: Option<String>,
        last_modified: Option<String>,
        content_sample: &str,
    ) -> Result<(), PipelineError> {
        let now = Utc::now();
        let ttl = (self.ttl_seconds)(source_type);
        let entry = CacheEntry {
            source_id: source_id.to_string(),
            url: url.to_string(),
            etag,
            last_modified,
            content_signature: content_signature(content_sample),
            article_count: articles.len(),
            cached_at: now,
            expires_at: now + chrono::Duration::seconds(ttl as i64),
        };
        let serialized = serde_json::to_vec(&entry).map_err(|e| PipelineError::Storage(e.to_string()))?;
        self.kv
            .set(&entry_key(source_id), serialized, ttl)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let articles_blob =
            serde_json::to_vec(articles).map_err(|e| PipelineError::Storage(e.to_string()))?;
        self.kv
            .set(&articles_key(source_id), articles_blob, ttl)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }

    pub async fn get_cached_articles(
        &self,
        source_id: &str,
    ) -> Result<Vec<RawArticle>, PipelineError> {
        let raw = self
            .kv
            .get(&articles_key(source_id))
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        match raw {
            None => Ok(Vec::new()),
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| PipelineError::Storage(e.to_string()))
            }
        }
    }

    pub async fn invalidate(&self, source_id: &str) -> Result<(), PipelineError> {
        self.kv
            .delete(&entry_key(source_id))
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        self.kv
            .delete(&articles_key(source_id))
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))
    }
}

fn looks_like_feed(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.ends_with(".xml") || lower.ends_with("/rss") || lower.contains("/feed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{HeadResult, RssMeta};
    use async_trait::async_trait;
    use newsroom_core::CapabilityError;
    use std::collections::BTreeMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeKv {
        store: StdMutex<BTreeMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl KvCache for FakeKv {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PipelineError> {
            Ok(self.store.lock().unwrap().get(key).cloned())
        }
        async fn set(&self, key: &str, value: Vec<u8>, _ttl_seconds: u64) -> Result<(), PipelineError> {
            self.store.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }
        async fn delete(&self, key: &str) -> Result<(), PipelineError> {
            self.store.lock().unwrap().remove(key);
            Ok(())
        }
        async fn scan(&self, _pattern: &str) -> Result<Vec<String>, PipelineError> {
            Ok(self.store.lock().unwrap().keys().cloned().collect())
        }
        async fn incr(&self, _key: &str) -> Result<i64, PipelineError> {
            Ok(1)
        }
        async fn list_push(&self, _key: &str, _value: Vec<u8>, _max_len: usize) -> Result<(), PipelineError> {
            Ok(())
        }
        async fn list_range(&self, _key: &str) -> Result<Vec<Vec<u8>>, PipelineError> {
            Ok(Vec::new())
        }
    }

    struct FakeDetector {
        not_modified: bool,
        sample: &'static str,
    }

    #[async_trait]
    impl ChangeDetector for FakeDetector {
        async fn conditional_head(
            &self,
            _url: &str,
            _etag: Option<&str>,
            _last_modified: Option<&str>,
        ) -> Result<HeadResult, CapabilityError> {
            Ok(HeadResult {
                not_modified: self.not_modified,
                etag: None,
                last_modified: None,
            })
        }
        async fn fetch_sample(&self, _url: &str, _max_bytes: usize) -> Result<String, CapabilityError> {
            Ok(self.sample.to_string())
        }
        async fn fetch_rss_meta(&self, _url: &str) -> Result<RssMeta, CapabilityError> {
            Ok(RssMeta::default())
        }
    }

    fn cache(detector: FakeDetector) -> SmartCache {
        SmartCache::new(
            Arc::new(FakeKv::default()),
            Arc::new(detector),
            Arc::new(CacheMetrics::new()),
            |_| 900,
        )
    }

    #[tokio::test]
    async fn missing_entry_forces_scrape() {
        let cache = cache(FakeDetector { not_modified: false, sample: "body" });
        let decision = cache
            .needs_scraping("src-1", "https://example.com/a", SourceType::News, false)
            .await;
        assert!(decision.should_scrape);
        assert_eq!(decision.reason, CacheDecisionReason::NoCacheEntry);
    }

    #[tokio::test]
    async fn forced_scrape_bypasses_everything() {
        let cache = cache(FakeDetector { not_modified: true, sample: "body" });
        let decision = cache
            .needs_scraping("src-1", "https://example.com/a", SourceType::News, true)
            .await;
        assert!(decision.should_scrape);
        assert_eq!(decision.reason, CacheDecisionReason::Forced);
    }

    #[tokio::test]
    async fn not_expired_entry_with_unchanged_content_skips_scrape() {
        let cache = cache(FakeDetector { not_modified: false, sample: "body" });
        let source_id = "src-2";
        cache
            .cache_articles(
                source_id,
                "https://example.com/a",
                SourceType::News,
                &[],
                None,
                None,
                "body",
            )
            .await
            .unwrap();
        let decision = cache
            .needs_scraping(source_id, "https://example.com/a", SourceType::News, false)
            .await;
        assert!(!decision.should_scrape);
        assert_eq!(decision.reason, CacheDecisionReason::ContentSignatureUnchanged);
    }

    #[tokio::test]
    async fn not_expired_entry_still_detects_304() {
        let cache = cache(FakeDetector { not_modified: true, sample: "body" });
        let source_id = "src-3";
        cache
            .cache_articles(
                source_id,
                "https://example.com/a",
                SourceType::News,
                &[],
                None,
                None,
                "body",
            )
            .await
            .unwrap();
        let decision = cache
            .needs_scraping(source_id, "https://example.com/a", SourceType::News, false)
            .await;
        assert!(!decision.should_scrape);
        assert_eq!(decision.reason, CacheDecisionReason::NotModified304);
    }

    #[tokio::test]
    async fn not_expired_entry_with_changed_content_triggers_scrape() {
        let cache = cache(FakeDetector { not_modified: false, sample: "different body" });
        let source_id = "src-4";
        cache
            .cache_articles(
                source_id,
                "https://example.com/a",
                SourceType::News,
                &[],
                None,
                None,
                "body",
            )
            .await
            .unwrap();
        let decision = cache
            .needs_scraping(source_id, "https://example.com/a", SourceType::News, false)
            .await;
        assert!(decision.should_scrape);
        assert_eq!(decision.reason, CacheDecisionReason::ContentSignatureChanged);
    }
}
