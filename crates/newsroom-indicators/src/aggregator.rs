//! Ties keyword matching, the six calculation types, and threshold/change
//! event detection together into the indicator pipeline (spec §4.6): one
//! [`IndicatorValue`] per active [`IndicatorDefinition`] per run, even
//! when no article matched it.
//!
//! `composite` and `weighted_average` are generic combination forms (see
//! `calculate.rs`'s module doc); here they're given a fixed recipe of
//! frequency/sentiment/numeric sub-scores since no indicator carries
//! named sub-component weights beyond its own thresholds.

use chrono::{DateTime, Utc};
use newsroom_common::{
    ArticleId, CalculationType, IndicatorDefinition, IndicatorEvent, IndicatorEventType, IndicatorThresholds,
    IndicatorValue, Severity,
};
use uuid::Uuid;

use crate::calculate::{self, MatchedArticle};
use crate::keyword;

const RAPID_CHANGE_DELTA: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub article_id: ArticleId,
    pub text: String,
    pub sentiment_score: Option<f64>,
    pub numeric_value: Option<f64>,
}

pub struct IndicatorAggregator {
    definitions: Vec<IndicatorDefinition>,
}

impl IndicatorAggregator {
    pub fn new(definitions: Vec<IndicatorDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[IndicatorDefinition] {
        &self.definitions
    }

    /// Computes one value per active indicator. An indicator with zero
    /// matched articles still gets a neutral-baseline value rather than
    /// being skipped, so downstream aggregation always sees every active
    /// indicator.
    pub fn compute(&self, now: DateTime<Utc>, articles: &[ArticleInput]) -> Vec<IndicatorValue> {
        self.definitions.iter().filter(|d| d.is_active).map(|def| self.compute_one(def, now, articles)).collect()
    }

    fn compute_one(&self, def: &IndicatorDefinition, now: DateTime<Utc>, articles: &[ArticleInput]) -> IndicatorValue {
        let mut matched: Vec<MatchedArticle> = Vec::new();
        let mut raw_count = 0usize;

        for article in articles {
            let score = keyword::score_article(&article.text, &def.keywords);
            if score > 0.0 {
                raw_count += 1;
            }
            if keyword::is_matched(score) {
                matched.push(MatchedArticle {
                    article_id: article.article_id.clone(),
                    match_score: score,
                    sentiment_score: article.sentiment_score,
                    numeric_value: article.numeric_value,
                });
            }
        }

        let value = self.calculate_value(def.calculation_type, &matched, &def.thresholds);
        let confidence = calculate::confidence(&matched);
        let sentiment_score = {
            let scored: Vec<f64> = matched.iter().filter_map(|a| a.sentiment_score).collect();
            if scored.is_empty() { None } else { Some(scored.iter().sum::<f64>() / scored.len() as f64) }
        };

        IndicatorValue {
            indicator_id: def.indicator_id.clone(),
            timestamp: now,
            value,
            confidence,
            article_count: matched.len(),
            source_articles: matched.iter().map(|a| a.article_id.clone()).collect(),
            raw_count,
            sentiment_score,
        }
    }

    fn calculate_value(&self, kind: CalculationType, matched: &[MatchedArticle], thresholds: &IndicatorThresholds) -> f64 {
        match kind {
            CalculationType::FrequencyCount => calculate::frequency_count(matched.len()),
            CalculationType::SentimentAggregate => calculate::sentiment_aggregate(matched),
            CalculationType::NumericExtraction => calculate::numeric_extraction(matched, thresholds),
            CalculationType::Ratio => {
                calculate::ratio(matched.len() as f64, matched.len().max(1) as f64, thresholds)
            }
            CalculationType::Composite => {
                let frequency = calculate::frequency_count(matched.len());
                let sentiment = calculate::sentiment_aggregate(matched);
                let numeric = calculate::numeric_extraction(matched, thresholds);
                calculate::composite(&[(frequency, 0.4), (sentiment, 0.3), (numeric, 0.3)])
            }
            CalculationType::WeightedAverage => {
                let frequency = calculate::frequency_count(matched.len());
                let sentiment = calculate::sentiment_aggregate(matched);
                calculate::weighted_average(&[(frequency, 0.5), (sentiment, 0.5)])
            }
        }
    }
}

fn breach_severity(distance_beyond: f64) -> Severity {
    if distance_beyond >= 30.0 {
        Severity::Critical
    } else if distance_beyond >= 20.0 {
        Severity::High
    } else if distance_beyond >= 10.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// `ThresholdBreach` when the value crosses outside `[low, high]` having
/// been inside it (or on the first reading); `RapidChange` when the swing
/// from the previous value is `>= 20` points. `Anomaly`, `CorrelationBreak`,
/// and `DataQuality` events have no grounded detection logic here and are
/// left to other layers.
pub fn detect_events(
    previous: Option<&IndicatorValue>,
    current: &IndicatorValue,
    thresholds: &IndicatorThresholds,
) -> Vec<IndicatorEvent> {
    let mut events = Vec::new();
    let was_outside = previous.is_some_and(|p| p.value > thresholds.high || p.value < thresholds.low);
    let is_outside_high = current.value > thresholds.high;
    let is_outside_low = current.value < thresholds.low;

    if (is_outside_high || is_outside_low) && !was_outside {
        let distance = if is_outside_high { current.value - thresholds.high } else { thresholds.low - current.value };
        events.push(IndicatorEvent {
            event_id: Uuid::new_v4(),
            indicator_id: current.indicator_id.clone(),
            timestamp: current.timestamp,
            event_type: IndicatorEventType::ThresholdBreach,
            severity: breach_severity(distance),
            value_before: previous.map(|p| p.value).unwrap_or(current.value),
            value_after: current.value,
            acknowledged: false,
        });
    }

    if let Some(prev) = previous {
        let delta = (current.value - prev.value).abs();
        if delta >= RAPID_CHANGE_DELTA {
            events.push(IndicatorEvent {
                event_id: Uuid::new_v4(),
                indicator_id: current.indicator_id.clone(),
                timestamp: current.timestamp,
                event_type: IndicatorEventType::RapidChange,
                severity: breach_severity(delta),
                value_before: prev.value,
                value_after: current.value,
                acknowledged: false,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsroom_common::PestelCategory;

    fn definition(id: &str, calculation_type: CalculationType, keywords: &[&str]) -> IndicatorDefinition {
        IndicatorDefinition {
            indicator_id: id.to_string(),
            indicator_name: id.to_string(),
            pestel_category: PestelCategory::Economic,
            calculation_type,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            base_weight: 1.0,
            thresholds: IndicatorThresholds { low: 20.0, high: 80.0 },
            is_active: true,
        }
    }

    fn article(id: &str, text: &str, sentiment: Option<f64>) -> ArticleInput {
        ArticleInput { article_id: id.to_string(), text: text.to_string(), sentiment_score: sentiment, numeric_value: None }
    }

    #[test]
    fn inactive_indicators_are_skipped() {
        let mut def = definition("a", CalculationType::FrequencyCount, &["inflation"]);
        def.is_active = false;
        let aggregator = IndicatorAggregator::new(vec![def]);
        let values = aggregator.compute(Utc::now(), &[]);
        assert!(values.is_empty());
    }

    #[test]
    fn unmatched_indicator_still_produces_a_neutral_value() {
        let def = definition("eco_inflation", CalculationType::FrequencyCount, &["inflation", "currency", "shortage"]);
        let aggregator = IndicatorAggregator::new(vec![def]);
        let values = aggregator.compute(Utc::now(), &[article("1", "Weather was fine today.", None)]);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, 50.0);
        assert_eq!(values[0].article_count, 0);
    }

    #[test]
    fn matched_articles_raise_frequency_count_value() {
        let def = definition("eco_inflation", CalculationType::FrequencyCount, &["inflation"]);
        let aggregator = IndicatorAggregator::new(vec![def]);
        let articles = vec![
            article("1", "Inflation hit a new high this quarter.", None),
            article("2", "Inflation worries grip markets.", None),
        ];
        let values = aggregator.compute(Utc::now(), &articles);
        assert_eq!(values[0].article_count, 2);
        assert!(values[0].value > 50.0);
    }

    #[test]
    fn threshold_breach_fires_only_on_crossing() {
        let thresholds = IndicatorThresholds { low: 20.0, high: 80.0 };
        let previous = IndicatorValue {
            indicator_id: "a".to_string(),
            timestamp: Utc::now(),
            value: 70.0,
            confidence: 0.8,
            article_count: 3,
            source_articles: vec![],
            raw_count: 3,
            sentiment_score: None,
        };
        let mut current = previous.clone();
        current.value = 85.0;

        let events = detect_events(Some(&previous), &current, &thresholds);
        assert!(events.iter().any(|e| e.event_type == IndicatorEventType::ThresholdBreach));

        let mut already_high = previous.clone();
        already_high.value = 90.0;
        let mut still_high = previous.clone();
        still_high.value = 92.0;
        let repeat_events = detect_events(Some(&already_high), &still_high, &thresholds);
        assert!(!repeat_events.iter().any(|e| e.event_type == IndicatorEventType::ThresholdBreach));
    }

    #[test]
    fn rapid_change_detected_on_large_swing() {
        let thresholds = IndicatorThresholds { low: 0.0, high: 100.0 };
        let previous = IndicatorValue {
            indicator_id: "a".to_string(),
            timestamp: Utc::now(),
            value: 40.0,
            confidence: 0.8,
            article_count: 3,
            source_articles: vec![],
            raw_count: 3,
            sentiment_score: None,
        };
        let mut current = previous.clone();
        current.value = 65.0;
        let events = detect_events(Some(&previous), &current, &thresholds);
        assert!(events.iter().any(|e| e.event_type == IndicatorEventType::RapidChange));
    }
}
