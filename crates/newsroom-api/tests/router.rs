use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use newsroom_api::{build_router, ApiState};
use newsroom_common::{
    CalculationType, IndicatorDefinition, IndicatorEvent, IndicatorThresholds, IndicatorValue,
    PestelCategory, SourceReputation, SourceTier,
};
use newsroom_core::repo::{
    IndicatorDefinitionRepo, IndicatorEventRepo, IndicatorValueRepo, KvCache, RepoResult,
    SourceReputationRepo,
};
use tower::ServiceExt;

struct FakeDefinitions(Vec<IndicatorDefinition>);

#[async_trait]
impl IndicatorDefinitionRepo for FakeDefinitions {
    async fn get(&self, indicator_id: &str) -> RepoResult<Option<IndicatorDefinition>> {
        Ok(self.0.iter().find(|d| d.indicator_id == indicator_id).cloned())
    }
    async fn list_active(&self) -> RepoResult<Vec<IndicatorDefinition>> {
        Ok(self.0.iter().filter(|d| d.is_active).cloned().collect())
    }
    async fn upsert(&self, _definition: &IndicatorDefinition) -> RepoResult<()> {
        Ok(())
    }
}

struct FakeValues(Mutex<BTreeMap<String, Vec<IndicatorValue>>>);

#[async_trait]
impl IndicatorValueRepo for FakeValues {
    async fn append(&self, value: &IndicatorValue) -> RepoResult<()> {
        self.0.lock().unwrap().entry(value.indicator_id.clone()).or_default().push(value.clone());
        Ok(())
    }
    async fn range(&self, indicator_id: &str, _from: DateTime<Utc>, _to: DateTime<Utc>) -> RepoResult<Vec<IndicatorValue>> {
        Ok(self.0.lock().unwrap().get(indicator_id).cloned().unwrap_or_default())
    }
    async fn latest(&self, indicator_id: &str) -> RepoResult<Option<IndicatorValue>> {
        Ok(self.0.lock().unwrap().get(indicator_id).and_then(|v| v.last().cloned()))
    }
}

struct FakeEvents;

#[async_trait]
impl IndicatorEventRepo for FakeEvents {
    async fn append(&self, _event: &IndicatorEvent) -> RepoResult<()> {
        Ok(())
    }
    async fn recent(&self, _indicator_id: &str, _limit: usize) -> RepoResult<Vec<IndicatorEvent>> {
        Ok(Vec::new())
    }
}

struct FakeReputation(Vec<SourceReputation>);

#[async_trait]
impl SourceReputationRepo for FakeReputation {
    async fn get(&self, source_id: &str) -> RepoResult<Option<SourceReputation>> {
        Ok(self.0.iter().find(|r| r.source_id == source_id).cloned())
    }
    async fn upsert(&self, _reputation: &SourceReputation) -> RepoResult<()> {
        Ok(())
    }
    async fn history(&self, _source_id: &str, _from: DateTime<Utc>, _to: DateTime<Utc>) -> RepoResult<Vec<(DateTime<Utc>, f64)>> {
        Ok(Vec::new())
    }
    async fn list_all(&self) -> RepoResult<Vec<SourceReputation>> {
        Ok(self.0.clone())
    }
}

struct FakeKv(Mutex<BTreeMap<String, Vec<u8>>>);

#[async_trait]
impl KvCache for FakeKv {
    async fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        Ok(self.0.lock().unwrap().get(key).cloned())
    }
    async fn set(&self, key: &str, value: Vec<u8>, _ttl_seconds: u64) -> RepoResult<()> {
        self.0.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
    async fn delete(&self, key: &str) -> RepoResult<()> {
        self.0.lock().unwrap().remove(key);
        Ok(())
    }
    async fn scan(&self, _pattern: &str) -> RepoResult<Vec<String>> {
        Ok(self.0.lock().unwrap().keys().cloned().collect())
    }
    async fn incr(&self, _key: &str) -> RepoResult<i64> {
        Ok(1)
    }
    async fn list_push(&self, _key: &str, _value: Vec<u8>, _max_len: usize) -> RepoResult<()> {
        Ok(())
    }
    async fn list_range(&self, _key: &str) -> RepoResult<Vec<Vec<u8>>> {
        Ok(Vec::new())
    }
}

fn test_state() -> Arc<ApiState> {
    let definition = IndicatorDefinition {
        indicator_id: "ECON_INFLATION".to_string(),
        indicator_name: "Inflation pressure".to_string(),
        pestel_category: PestelCategory::Economic,
        calculation_type: CalculationType::FrequencyCount,
        keywords: vec!["inflation".to_string()],
        base_weight: 1.0,
        thresholds: IndicatorThresholds { low: 30.0, high: 70.0 },
        is_active: true,
    };
    let value = IndicatorValue {
        indicator_id: "ECON_INFLATION".to_string(),
        timestamp: Utc::now(),
        value: 62.0,
        confidence: 0.8,
        article_count: 4,
        source_articles: vec![],
        raw_count: 4,
        sentiment_score: Some(-0.2),
    };
    let mut values = BTreeMap::new();
    values.insert("ECON_INFLATION".to_string(), vec![value]);

    let reputation = SourceReputation::new("reuters", SourceTier::Tier1, Utc::now());

    Arc::new(ApiState::new(
        Arc::new(FakeDefinitions(vec![definition])),
        Arc::new(FakeValues(Mutex::new(values))),
        Arc::new(FakeEvents),
        Arc::new(FakeReputation(vec![reputation])),
        Arc::new(FakeKv(Mutex::new(BTreeMap::new()))),
    ))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 1_000_000).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_ok() {
    let router = build_router(test_state());
    let response = router.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_active_indicators() {
    let router = build_router(test_state());
    let response = router.oneshot(Request::builder().uri("/api/indicators").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["degraded"], false);
    assert_eq!(json["indicators"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn national_activity_index_reflects_latest_value() {
    let router = build_router(test_state());
    let response = router
        .oneshot(Request::builder().uri("/api/national-activity-index").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(json["nai"].as_f64().unwrap() > 0.0);
    assert_eq!(json["degraded"], false);
}

#[tokio::test]
async fn missing_insight_bundle_is_not_found() {
    let router = build_router(test_state());
    let response = router
        .oneshot(Request::builder().uri("/api/insights/acme-corp").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_sources_lists_known_reputations() {
    let router = build_router(test_state());
    let response = router.oneshot(Request::builder().uri("/admin/sources").body(Body::empty()).unwrap()).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["sources"].as_array().unwrap().len(), 1);
    assert_eq!(json["sources"][0]["source_id"], "reuters");
}
