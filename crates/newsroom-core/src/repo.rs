//! Repository contracts for the collaborator stores in spec §6: the
//! relational store (5 repositories), the document store, and the KV
//! cache. Concrete adapters (Postgres, Redis, …) live outside this crate;
//! only the narrow interface the core depends on is defined here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use newsroom_common::{
    DetectedOpportunity, DetectedRisk, IndicatorDefinition, IndicatorEvent, IndicatorValue,
    PipelineError, SourceReputation,
};

pub type RepoResult<T> = Result<T, PipelineError>;

#[async_trait]
pub trait IndicatorDefinitionRepo: Send + Sync {
    async fn get(&self, indicator_id: &str) -> RepoResult<Option<IndicatorDefinition>>;
    async fn list_active(&self) -> RepoResult<Vec<IndicatorDefinition>>;
    async fn upsert(&self, definition: &IndicatorDefinition) -> RepoResult<()>;
}

/// Time-series repository; expects range queries by `indicator_id` + time
/// window (spec §6). Primary key is `(indicator_id, timestamp)` and writes
/// are append-only — the adapter must reject or ignore a write for a
/// timestamp older than the latest stored value (spec §5 monotonic
/// emission guarantee).
#[async_trait]
pub trait IndicatorValueRepo: Send + Sync {
    async fn append(&self, value: &IndicatorValue) -> RepoResult<()>;
    async fn range(
        &self,
        indicator_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<IndicatorValue>>;
    async fn latest(&self, indicator_id: &str) -> RepoResult<Option<IndicatorValue>>;
}

#[async_trait]
pub trait IndicatorEventRepo: Send + Sync {
    async fn append(&self, event: &IndicatorEvent) -> RepoResult<()>;
    async fn recent(&self, indicator_id: &str, limit: usize) -> RepoResult<Vec<IndicatorEvent>>;
}

/// Source reputation repository, with an append-only history sub-table
/// (spec §6). Callers must serialize writes per `source_id` (spec §5) —
/// this trait does not enforce that itself, it is the adapter's
/// transactional contract.
#[async_trait]
pub trait SourceReputationRepo: Send + Sync {
    async fn get(&self, source_id: &str) -> RepoResult<Option<SourceReputation>>;
    async fn upsert(&self, reputation: &SourceReputation) -> RepoResult<()>;
    async fn history(
        &self,
        source_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<(DateTime<Utc>, f64)>>;
    /// All known sources, for admin/inspection surfaces (spec §6 admin
    /// endpoint). No ordering is guaranteed.
    async fn list_all(&self) -> RepoResult<Vec<SourceReputation>>;
}

#[async_trait]
pub trait BusinessInsightRepo: Send + Sync {
    async fn save_risk(&self, risk: &DetectedRisk) -> RepoResult<()>;
    async fn save_opportunity(&self, opportunity: &DetectedOpportunity) -> RepoResult<()>;
    async fn risks_for_company(&self, company_id: &str) -> RepoResult<Vec<DetectedRisk>>;
    async fn opportunities_for_company(
        &self,
        company_id: &str,
    ) -> RepoResult<Vec<DetectedOpportunity>>;
}

/// Unstructured payloads queried by article_id or insight_id (spec §6):
/// raw article body, enrichment features, reasoning documents, narratives.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, key: &str, document: serde_json::Value) -> RepoResult<()>;
    async fn get(&self, key: &str) -> RepoResult<Option<serde_json::Value>>;
}

/// String keys, value = bytes, per-key TTL, atomic increment, SCAN by
/// pattern, list push/trim for sliding histories (spec §6).
#[async_trait]
pub trait KvCache: Send + Sync {
    async fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> RepoResult<()>;
    async fn delete(&self, key: &str) -> RepoResult<()>;
    async fn scan(&self, pattern: &str) -> RepoResult<Vec<String>>;
    async fn incr(&self, key: &str) -> RepoResult<i64>;
    async fn list_push(&self, key: &str, value: Vec<u8>, max_len: usize) -> RepoResult<()>;
    async fn list_range(&self, key: &str) -> RepoResult<Vec<Vec<u8>>>;
}
