//! Quality scoring (spec §4.5 item 4): a weighted composite across
//! completeness, consistency, recency, source-trust, and readability,
//! producing a 0–100 score and a `QualityBand`.

use chrono::{DateTime, Utc};

use newsroom_common::{QualityBand, SourceReputation};

#[derive(Debug, Clone)]
pub struct QualityDimensions {
    pub completeness: f64,
    pub consistency: f64,
    pub recency: f64,
    pub source_trust: f64,
    pub readability: f64,
}

#[derive(Debug, Clone)]
pub struct QualityResult {
    pub score: f64,
    pub band: QualityBand,
    pub dimensions: QualityDimensions,
}

pub struct QualityWeights {
    pub completeness: f64,
    pub consistency: f64,
    pub recency: f64,
    pub source_trust: f64,
    pub readability: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self { completeness: 0.25, consistency: 0.2, recency: 0.2, source_trust: 0.25, readability: 0.1 }
    }
}

/// Fraction of expected fields present: title, body (above a minimal
/// length), author, and published timestamp.
fn completeness(title: &str, body: &str, author: Option<&str>, published_at: Option<DateTime<Utc>>) -> f64 {
    let mut present = 0.0;
    let mut total = 0.0;

    total += 1.0;
    if !title.trim().is_empty() {
        present += 1.0;
    }
    total += 1.0;
    if body.split_whitespace().count() >= 50 {
        present += 1.0;
    }
    total += 1.0;
    if author.is_some_and(|a| !a.trim().is_empty()) {
        present += 1.0;
    }
    total += 1.0;
    if published_at.is_some() {
        present += 1.0;
    }

    (present / total) * 100.0
}

/// Penalizes titles that don't share any meaningful word with the body —
/// a cheap proxy for title/body consistency without full NLI.
fn consistency(title: &str, body: &str) -> f64 {
    let title_words: std::collections::BTreeSet<String> =
        title.to_lowercase().split_whitespace().filter(|w| w.len() > 3).map(str::to_string).collect();
    if title_words.is_empty() {
        return 60.0;
    }
    let body_lower = body.to_lowercase();
    let shared = title_words.iter().filter(|w| body_lower.contains(w.as_str())).count();
    let ratio = shared as f64 / title_words.len() as f64;
    (40.0 + ratio * 60.0).min(100.0)
}

/// Freshness decays linearly to a floor of 20 over 48 hours; articles with
/// no timestamp get a neutral 50.
fn recency(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match published_at {
        None => 50.0,
        Some(ts) => {
            let age_hours = (now - ts).num_minutes().max(0) as f64 / 60.0;
            let fraction_elapsed = (age_hours / 48.0).min(1.0);
            100.0 - fraction_elapsed * 80.0
        }
    }
}

fn source_trust(reputation: Option<&SourceReputation>) -> f64 {
    reputation.map(|r| r.reputation_score * 100.0).unwrap_or(40.0)
}

/// Average sentence length scored against a comfortable 12–24 word band;
/// far outside it (wall-of-text or telegraphic fragments) loses points.
fn readability(body: &str) -> f64 {
    let sentences: Vec<&str> = body.split(['.', '!', '?']).map(str::trim).filter(|s| !s.is_empty()).collect();
    if sentences.is_empty() {
        return 50.0;
    }
    let avg_words =
        sentences.iter().map(|s| s.split_whitespace().count()).sum::<usize>() as f64 / sentences.len() as f64;
    if (12.0..=24.0).contains(&avg_words) {
        100.0
    } else if avg_words < 12.0 {
        60.0 + (avg_words / 12.0) * 40.0
    } else {
        (100.0 - (avg_words - 24.0) * 2.0).max(30.0)
    }
}

pub struct QualityScorer {
    weights: QualityWeights,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self { weights: QualityWeights::default() }
    }
}

impl QualityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: QualityWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        title: &str,
        body: &str,
        author: Option<&str>,
        published_at: Option<DateTime<Utc>>,
        reputation: Option<&SourceReputation>,
        now: DateTime<Utc>,
    ) -> QualityResult {
        let dimensions = QualityDimensions {
            completeness: completeness(title, body, author, published_at),
            consistency: consistency(title, body),
            recency: recency(published_at, now),
            source_trust: source_trust(reputation),
            readability: readability(body),
        };

        let score = (dimensions.completeness * self.weights.completeness
            + dimensions.consistency * self.weights.consistency
            + dimensions.recency * self.weights.recency
            + dimensions.source_trust * self.weights.source_trust
            + dimensions.readability * self.weights.readability)
            .clamp(0.0, 100.0);

        QualityResult { score, band: QualityBand::from_score(score), dimensions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn long_body(n: usize) -> String {
        "word ".repeat(n)
    }

    #[test]
    fn complete_fresh_article_scores_high() {
        let scorer = QualityScorer::new();
        let now = Utc::now();
        let result = scorer.score(
            "Central bank announces new measures to tame inflation",
            &format!("The central bank announced new measures to tame inflation today. {}", long_body(60)),
            Some("Jane Reporter"),
            Some(now - Duration::minutes(10)),
            None,
            now,
        );
        assert!(result.score > 60.0);
    }

    #[test]
    fn missing_fields_lower_completeness() {
        let full = completeness("Title", &long_body(60), Some("Author"), Some(Utc::now()));
        let partial = completeness("Title", "short", None, None);
        assert!(full > partial);
    }

    #[test]
    fn old_article_scores_lower_recency_than_fresh() {
        let now = Utc::now();
        let fresh = recency(Some(now - Duration::minutes(5)), now);
        let old = recency(Some(now - Duration::hours(72)), now);
        assert!(fresh > old);
    }

    #[test]
    fn band_from_score_matches_quality_band_thresholds() {
        assert_eq!(QualityBand::from_score(90.0), QualityBand::Excellent);
        assert_eq!(QualityBand::from_score(50.0), QualityBand::Fair);
        assert_eq!(QualityBand::from_score(10.0), QualityBand::Poor);
    }
}
