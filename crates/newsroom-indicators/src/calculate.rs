//! The six calculation types named in spec §4.6. `frequency_count` and
//! `sentiment_aggregate` have exact formulas in the spec; `numeric_extraction`,
//! `composite`, `ratio`, and `weighted_average` are "defined by the
//! indicator's metadata" — implemented here as the natural generic forms
//! (linear rescale against the indicator's own thresholds, weighted
//! combination of named component values) since no indicator-specific
//! metadata schema beyond `IndicatorThresholds` was named in the source.

use newsroom_common::IndicatorThresholds;

#[derive(Debug, Clone)]
pub struct MatchedArticle {
    pub article_id: String,
    pub match_score: f64,
    pub sentiment_score: Option<f64>,
    pub numeric_value: Option<f64>,
}

/// `value = 50 + min(50, matches × 5)` — neutral baseline of 50, zero
/// matches leaves it untouched (spec §4.6).
pub fn frequency_count(matched_article_count: usize) -> f64 {
    50.0 + (matched_article_count as f64 * 5.0).min(50.0)
}

/// Mean sentiment of matched articles, rescaled from `[-1, 1]` to
/// `[0, 100]`. Articles with no sentiment score are excluded from the mean;
/// an indicator with no scored articles reads as neutral (50.0).
pub fn sentiment_aggregate(articles: &[MatchedArticle]) -> f64 {
    let scores: Vec<f64> = articles.iter().filter_map(|a| a.sentiment_score).collect();
    if scores.is_empty() {
        return 50.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    ((mean + 1.0) / 2.0) * 100.0
}

/// Mean of extracted numeric values, linearly rescaled against the
/// indicator's own `low`/`high` thresholds (`low` → 0, `high` → 100),
/// clamped to `[0, 100]`.
pub fn numeric_extraction(articles: &[MatchedArticle], thresholds: &IndicatorThresholds) -> f64 {
    let values: Vec<f64> = articles.iter().filter_map(|a| a.numeric_value).collect();
    if values.is_empty() {
        return 50.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    rescale(mean, thresholds)
}

fn rescale(value: f64, thresholds: &IndicatorThresholds) -> f64 {
    let span = thresholds.high - thresholds.low;
    if span.abs() < f64::EPSILON {
        return 50.0;
    }
    (((value - thresholds.low) / span) * 100.0).clamp(0.0, 100.0)
}

/// Weighted combination of named component scores (already 0–100), each
/// paired with its weight. Weights are normalized so they needn't sum to 1.
pub fn composite(components: &[(f64, f64)]) -> f64 {
    weighted_average(components)
}

/// Ratio of two quantities, rescaled against the indicator's thresholds
/// the same way `numeric_extraction` rescales a raw value.
pub fn ratio(numerator: f64, denominator: f64, thresholds: &IndicatorThresholds) -> f64 {
    if denominator.abs() < f64::EPSILON {
        return 50.0;
    }
    rescale(numerator / denominator, thresholds)
}

/// `Σ(value × weight) / Σ(weight)`, the shared implementation behind both
/// `composite` and `weighted_average` — spec §4.6 names them separately
/// but describes the same combination formula for both.
pub fn weighted_average(components: &[(f64, f64)]) -> f64 {
    let weight_sum: f64 = components.iter().map(|(_, w)| w).sum();
    if weight_sum.abs() < f64::EPSILON {
        return 50.0;
    }
    components.iter().map(|(v, w)| v * w).sum::<f64>() / weight_sum
}

/// `confidence = min(1, article_count / 5) × avg_match_score` (spec §4.6),
/// averaged over the matched articles only.
pub fn confidence(articles: &[MatchedArticle]) -> f64 {
    if articles.is_empty() {
        return 0.0;
    }
    let avg_match_score = articles.iter().map(|a| a.match_score).sum::<f64>() / articles.len() as f64;
    (articles.len() as f64 / 5.0).min(1.0) * avg_match_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, match_score: f64, sentiment: Option<f64>) -> MatchedArticle {
        MatchedArticle { article_id: id.to_string(), match_score, sentiment_score: sentiment, numeric_value: None }
    }

    #[test]
    fn frequency_count_baseline_with_no_matches() {
        assert_eq!(frequency_count(0), 50.0);
    }

    #[test]
    fn frequency_count_caps_at_one_hundred() {
        assert_eq!(frequency_count(20), 100.0);
        assert_eq!(frequency_count(5), 75.0);
    }

    #[test]
    fn sentiment_aggregate_rescales_negative_mean() {
        let articles = vec![article("a", 1.0, Some(-1.0)), article("b", 1.0, Some(0.0))];
        assert_eq!(sentiment_aggregate(&articles), 25.0);
    }

    #[test]
    fn sentiment_aggregate_defaults_neutral_with_no_scored_articles() {
        let articles = vec![article("a", 1.0, None)];
        assert_eq!(sentiment_aggregate(&articles), 50.0);
    }

    #[test]
    fn confidence_scales_with_article_count_and_match_quality() {
        let five_strong = vec![article("a", 1.0, None); 5];
        assert_eq!(confidence(&five_strong), 1.0);

        let two_weak = vec![article("a", 0.4, None); 2];
        assert!((confidence(&two_weak) - (2.0 / 5.0 * 0.4)).abs() < 1e-9);
    }

    #[test]
    fn weighted_average_normalizes_by_weight_sum() {
        let value = weighted_average(&[(100.0, 1.0), (0.0, 1.0)]);
        assert_eq!(value, 50.0);
    }

    #[test]
    fn ratio_rescales_against_thresholds() {
        let thresholds = IndicatorThresholds { low: 0.0, high: 2.0 };
        assert_eq!(ratio(1.0, 1.0, &thresholds), 50.0);
    }
}
