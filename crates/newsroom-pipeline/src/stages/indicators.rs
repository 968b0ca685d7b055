//! L3 indicator aggregation (spec §4.6): a buffered window of recently
//! enriched articles feeds a periodic batch compute, one [`IndicatorValue`]
//! per active indicator, with threshold/rapid-change event detection
//! against the previously stored value. Unlike L1/L2, this stage is not
//! per-article — it is grounded on the same "accumulate, then batch" shape
//! as `newsroom-learning`'s auto-tuner window, generalised to indicators.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use newsroom_common::{EnrichedArticle, IndicatorValue};
use newsroom_core::repo::{IndicatorEventRepo, IndicatorValueRepo};
use newsroom_indicators::aggregator::{detect_events, ArticleInput, IndicatorAggregator};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::PipelineRunError;

pub struct IndicatorStage {
    aggregator: Arc<IndicatorAggregator>,
    value_repo: Arc<dyn IndicatorValueRepo>,
    event_repo: Arc<dyn IndicatorEventRepo>,
    window: Mutex<VecDeque<ArticleInput>>,
    window_capacity: usize,
}

impl IndicatorStage {
    pub fn new(
        aggregator: Arc<IndicatorAggregator>,
        value_repo: Arc<dyn IndicatorValueRepo>,
        event_repo: Arc<dyn IndicatorEventRepo>,
        window_capacity: usize,
    ) -> Self {
        Self { aggregator, value_repo, event_repo, window: Mutex::new(VecDeque::new()), window_capacity: window_capacity.max(1) }
    }

    /// Feeds one enriched article into the aggregation window. Evicts the
    /// oldest entry once the window is full (spec §4.6 names a rolling
    /// window, not an unbounded accumulator).
    pub async fn ingest(&self, article: &EnrichedArticle) {
        let input = ArticleInput {
            article_id: article.raw.article_id.clone(),
            text: format!("{} {}", article.raw.title, article.raw.body),
            sentiment_score: Some(article.sentiment_score),
            numeric_value: None,
        };
        let mut window = self.window.lock().await;
        if window.len() >= self.window_capacity {
            window.pop_front();
        }
        window.push_back(input);
    }

    /// Runs one batch compute over the current window, appending monotonic
    /// values and detected events, and returns the values produced (for L4
    /// to key a run off of). Stale values (older than the last stored
    /// timestamp) are dropped per the repo's append-only contract rather
    /// than surfaced as an error.
    pub async fn run_batch(&self, now: DateTime<Utc>) -> Result<Vec<IndicatorValue>, PipelineRunError> {
        let snapshot: Vec<ArticleInput> = self.window.lock().await.iter().cloned().collect();
        let values = self.aggregator.compute(now, &snapshot);

        let mut accepted = Vec::with_capacity(values.len());
        for value in values {
            let previous = self
                .value_repo
                .latest(&value.indicator_id)
                .await
                .map_err(|e| PipelineRunError::Repository(e.to_string()))?;

            if let Some(prev) = &previous {
                if prev.timestamp >= value.timestamp {
                    warn!(indicator_id = %value.indicator_id, "dropping stale indicator value");
                    continue;
                }
            }

            let Some(definition) = self.aggregator.definitions().iter().find(|d| d.indicator_id == value.indicator_id) else {
                continue;
            };
            let events = detect_events(previous.as_ref(), &value, &definition.thresholds);

            self.value_repo.append(&value).await.map_err(|e| PipelineRunError::Repository(e.to_string()))?;
            for event in &events {
                self.event_repo.append(event).await.map_err(|e| PipelineRunError::Repository(e.to_string()))?;
            }
            if !events.is_empty() {
                info!(indicator_id = %value.indicator_id, event_count = events.len(), "indicator events detected");
            }
            accepted.push(value);
        }

        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsroom_common::{CalculationType, IndicatorDefinition, IndicatorThresholds, PestelCategory};
    use std::sync::Mutex as StdMutex;

    struct InMemoryValueRepo(StdMutex<Vec<IndicatorValue>>);
    #[async_trait::async_trait]
    impl IndicatorValueRepo for InMemoryValueRepo {
        async fn append(&self, value: &IndicatorValue) -> newsroom_core::repo::RepoResult<()> {
            self.0.lock().unwrap().push(value.clone());
            Ok(())
        }
        async fn range(
            &self,
            indicator_id: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> newsroom_core::repo::RepoResult<Vec<IndicatorValue>> {
            Ok(self.0.lock().unwrap().iter().filter(|v| v.indicator_id == indicator_id).cloned().collect())
        }
        async fn latest(&self, indicator_id: &str) -> newsroom_core::repo::RepoResult<Option<IndicatorValue>> {
            Ok(self.0.lock().unwrap().iter().rev().find(|v| v.indicator_id == indicator_id).cloned())
        }
    }

    struct InMemoryEventRepo(StdMutex<Vec<newsroom_common::IndicatorEvent>>);
    #[async_trait::async_trait]
    impl IndicatorEventRepo for InMemoryEventRepo {
        async fn append(&self, event: &newsroom_common::IndicatorEvent) -> newsroom_core::repo::RepoResult<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
        async fn recent(&self, indicator_id: &str, limit: usize) -> newsroom_core::repo::RepoResult<Vec<newsroom_common::IndicatorEvent>> {
            Ok(self.0.lock().unwrap().iter().rev().filter(|e| e.indicator_id == indicator_id).take(limit).cloned().collect())
        }
    }

    fn definition() -> IndicatorDefinition {
        IndicatorDefinition {
            indicator_id: "eco_inflation".to_string(),
            indicator_name: "Inflation".to_string(),
            pestel_category: PestelCategory::Economic,
            calculation_type: CalculationType::FrequencyCount,
            keywords: vec!["inflation".to_string()],
            base_weight: 1.0,
            thresholds: IndicatorThresholds { low: 20.0, high: 80.0 },
            is_active: true,
        }
    }

    #[tokio::test]
    async fn batch_run_appends_values_and_evicts_window_overflow() {
        let aggregator = Arc::new(IndicatorAggregator::new(vec![definition()]));
        let value_repo = Arc::new(InMemoryValueRepo(StdMutex::new(Vec::new())));
        let event_repo = Arc::new(InMemoryEventRepo(StdMutex::new(Vec::new())));
        let stage = IndicatorStage::new(aggregator, value_repo.clone(), event_repo, 2);

        for i in 0..5 {
            let raw = newsroom_common::RawArticle {
                article_id: format!("a{i}"),
                source_id: "wire".to_string(),
                scrape_timestamp: Utc::now(),
                title: "Inflation surges".to_string(),
                body: "Inflation worries grow across markets.".to_string(),
                author: None,
                publish_date: None,
                url: format!("https://example.com/{i}"),
                raw_html_headers: Default::default(),
            };
            let enriched = newsroom_common::EnrichedArticle {
                raw,
                pestel_category: PestelCategory::Economic,
                category_confidences: Default::default(),
                urgency_level: newsroom_common::UrgencyLevel::Low,
                business_relevance: 10.0,
                sentiment_score: -0.2,
                sentiment_level: newsroom_common::SentimentLevel::Negative,
                entities: Vec::new(),
                topic_id: None,
                quality_score: 0.8,
                quality_band: newsroom_common::QualityBand::Good,
            };
            stage.ingest(&enriched).await;
        }

        assert_eq!(stage.window.lock().await.len(), 2);

        let values = stage.run_batch(Utc::now()).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(value_repo.0.lock().unwrap().len(), 1);
    }
}
