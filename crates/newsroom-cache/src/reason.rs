use std::fmt;

/// Enumerated, bounded set of reasons the cache decides to (re)scrape or
/// skip a source (spec §4.1: "miss reasons are enumerated and bounded").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecisionReason {
    Forced,
    NoCacheEntry,
    TtlExpired,
    NotModified304,
    HeadersChanged,
    ContentSignatureUnchanged,
    ContentSignatureChanged,
    RssUnchanged,
    RssChanged,
    RevalidationError,
    SourceDisabled,
}

impl fmt::Display for CacheDecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CacheDecisionReason::Forced => "forced",
            CacheDecisionReason::NoCacheEntry => "no_cache_entry",
            CacheDecisionReason::TtlExpired => "ttl_expired",
            CacheDecisionReason::NotModified304 => "not_modified_304",
            CacheDecisionReason::HeadersChanged => "headers_changed",
            CacheDecisionReason::ContentSignatureUnchanged => "content_signature_unchanged",
            CacheDecisionReason::ContentSignatureChanged => "content_signature_changed",
            CacheDecisionReason::RssUnchanged => "rss_unchanged",
            CacheDecisionReason::RssChanged => "rss_changed",
            CacheDecisionReason::RevalidationError => "revalidation_error",
            CacheDecisionReason::SourceDisabled => "source_disabled",
        };
        f.write_str(s)
    }
}

/// The outcome of [`crate::SmartCache::needs_scraping`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrapeDecision {
    pub should_scrape: bool,
    pub reason: CacheDecisionReason,
    pub confidence: f64,
}

impl ScrapeDecision {
    pub fn new(should_scrape: bool, reason: CacheDecisionReason, confidence: f64) -> Self {
        Self {
            should_scrape,
            reason,
            confidence,
        }
    }
}
