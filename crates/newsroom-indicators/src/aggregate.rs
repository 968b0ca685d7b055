//! Composite/category scoring and the National Activity Index (spec §4.6
//! "Composite/category scores"). Category weights (`Economic = 1.2`,
//! others between 0.8 and 1.0) are an Open Question resolution — the spec
//! names the Economic weight and the range for the rest but not their
//! individual values; chosen here by rough influence on the other
//! PESTEL categories on the NAI (Political and Social carry slightly more
//! weight than Technological/Environmental/Legal for a national-activity
//! index).

use std::collections::BTreeMap;

use newsroom_common::{IndicatorValue, PestelCategory};

pub fn category_weight(category: PestelCategory) -> f64 {
    match category {
        PestelCategory::Economic => 1.2,
        PestelCategory::Political => 1.0,
        PestelCategory::Social => 0.95,
        PestelCategory::Technological => 0.85,
        PestelCategory::Environmental => 0.85,
        PestelCategory::Legal => 0.8,
    }
}

#[derive(Debug, Clone)]
pub struct CategoryScore {
    pub category: PestelCategory,
    pub score: f64,
    pub confidence: f64,
}

/// Confidence-weighted mean of the indicator values belonging to each
/// category. Categories with no indicator values this run are omitted.
pub fn category_scores(values: &[(PestelCategory, &IndicatorValue)]) -> Vec<CategoryScore> {
    let mut grouped: BTreeMap<PestelCategory, Vec<&IndicatorValue>> = BTreeMap::new();
    for (category, value) in values {
        grouped.entry(*category).or_default().push(value);
    }

    grouped
        .into_iter()
        .map(|(category, members)| {
            let weight_sum: f64 = members.iter().map(|v| v.confidence).sum();
            let score = if weight_sum.abs() < f64::EPSILON {
                members.iter().map(|v| v.value).sum::<f64>() / members.len() as f64
            } else {
                members.iter().map(|v| v.value * v.confidence).sum::<f64>() / weight_sum
            };
            let confidence = weight_sum / members.len() as f64;
            CategoryScore { category, score, confidence }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaiBand {
    VeryHigh,
    High,
    Moderate,
    Neutral,
    Low,
    Declining,
    Critical,
}

impl NaiBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            NaiBand::VeryHigh
        } else if score >= 65.0 {
            NaiBand::High
        } else if score >= 55.0 {
            NaiBand::Moderate
        } else if score >= 45.0 {
            NaiBand::Neutral
        } else if score >= 35.0 {
            NaiBand::Low
        } else if score >= 20.0 {
            NaiBand::Declining
        } else {
            NaiBand::Critical
        }
    }
}

/// National Activity Index: the category-weighted mean of category scores
/// (spec §4.6). Returns `None` when no categories had data this run.
pub fn national_activity_index(categories: &[CategoryScore]) -> Option<(f64, NaiBand)> {
    if categories.is_empty() {
        return None;
    }
    let weight_sum: f64 = categories.iter().map(|c| category_weight(c.category)).sum();
    let nai = categories.iter().map(|c| c.score * category_weight(c.category)).sum::<f64>() / weight_sum;
    Some((nai, NaiBand::from_score(nai)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn indicator_value(value: f64, confidence: f64) -> IndicatorValue {
        IndicatorValue {
            indicator_id: "test".to_string(),
            timestamp: Utc::now(),
            value,
            confidence,
            article_count: 3,
            source_articles: vec![],
            raw_count: 3,
            sentiment_score: None,
        }
    }

    #[test]
    fn category_scores_weight_by_confidence() {
        let a = indicator_value(80.0, 1.0);
        let b = indicator_value(20.0, 0.2);
        let values = vec![(PestelCategory::Economic, &a), (PestelCategory::Economic, &b)];
        let scores = category_scores(&values);
        assert_eq!(scores.len(), 1);
        assert!(scores[0].score > 50.0);
    }

    #[test]
    fn nai_bands_match_named_thresholds() {
        assert_eq!(NaiBand::from_score(85.0), NaiBand::VeryHigh);
        assert_eq!(NaiBand::from_score(60.0), NaiBand::Moderate);
        assert_eq!(NaiBand::from_score(10.0), NaiBand::Critical);
    }

    #[test]
    fn nai_is_none_with_no_category_data() {
        assert!(national_activity_index(&[]).is_none());
    }

    #[test]
    fn economic_category_outweighs_legal_in_nai() {
        let economic = CategoryScore { category: PestelCategory::Economic, score: 80.0, confidence: 1.0 };
        let legal = CategoryScore { category: PestelCategory::Legal, score: 20.0, confidence: 1.0 };
        let (nai, _) = national_activity_index(&[economic, legal]).unwrap();
        // Economic's 1.2 weight vs Legal's 0.8 pulls the mean above the
        // unweighted midpoint of 50.
        assert!(nai > 50.0);
    }
}
