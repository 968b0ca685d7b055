//! Trust scoring (spec §4.3 "TrustCalculator"):
//! `TrustScore = clamp(0, 100, 40×reputation + 40×corroboration_weight + 20×freshness_weight)`.

use chrono::{DateTime, Utc};
use newsroom_common::quality::clamp;

use crate::claims::Claim;
use crate::corroboration::CorroborationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Unverified,
    Low,
    Moderate,
    High,
    Verified,
}

impl TrustLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            TrustLevel::Verified
        } else if score >= 70.0 {
            TrustLevel::High
        } else if score >= 55.0 {
            TrustLevel::Moderate
        } else if score >= 40.0 {
            TrustLevel::Low
        } else {
            TrustLevel::Unverified
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrossValidationResult {
    pub score: f64,
    pub trust_level: TrustLevel,
    pub source_reputation: f64,
    pub claims: Vec<Claim>,
    pub corroboration: CorroborationLevel,
    pub contradictions: Vec<String>,
}

fn corroboration_weight(level: CorroborationLevel) -> f64 {
    match level {
        CorroborationLevel::None => 0.0,
        CorroborationLevel::Weak => 0.25,
        CorroborationLevel::Moderate => 0.5,
        CorroborationLevel::Strong => 0.75,
        CorroborationLevel::Verified => 1.0,
    }
}

/// Freshness is not pinned to a concrete decay curve in the source spec;
/// a linear decay to zero over one week is the simplest monotone choice
/// consistent with "more recent corroboration counts for more" and is
/// recorded as a resolved Open Question.
pub fn freshness_weight(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - published_at).num_minutes() as f64 / 60.0;
    clamp(1.0 - age_hours / (24.0 * 7.0), 0.0, 1.0)
}

pub struct TrustCalculator;

impl TrustCalculator {
    pub fn score(
        source_reputation: f64,
        corroboration: CorroborationLevel,
        published_at: DateTime<Utc>,
        now: DateTime<Utc>,
        claims: Vec<Claim>,
        contradictions: Vec<String>,
    ) -> CrossValidationResult {
        let freshness = freshness_weight(published_at, now);
        let score = clamp(
            40.0 * source_reputation.clamp(0.0, 1.0)
                + 40.0 * corroboration_weight(corroboration)
                + 20.0 * freshness,
            0.0,
            100.0,
        );
        CrossValidationResult {
            score,
            trust_level: TrustLevel::from_score(score),
            source_reputation,
            claims,
            corroboration,
            contradictions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn trust_level_boundaries_closed_below() {
        assert_eq!(TrustLevel::from_score(85.0), TrustLevel::Verified);
        assert_eq!(TrustLevel::from_score(70.0), TrustLevel::High);
        assert_eq!(TrustLevel::from_score(55.0), TrustLevel::Moderate);
        assert_eq!(TrustLevel::from_score(40.0), TrustLevel::Low);
        assert_eq!(TrustLevel::from_score(39.9), TrustLevel::Unverified);
    }

    #[test]
    fn fresh_article_has_full_freshness_weight() {
        let now = Utc::now();
        assert!((freshness_weight(now, now) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn week_old_article_has_zero_freshness_weight() {
        let now = Utc::now();
        let week_ago = now - Duration::hours(24 * 7);
        assert!(freshness_weight(week_ago, now) <= 0.0001);
    }

    #[test]
    fn full_reputation_full_corroboration_full_freshness_scores_100() {
        let now = Utc::now();
        let result = TrustCalculator::score(1.0, CorroborationLevel::Verified, now, now, Vec::new(), Vec::new());
        assert!((result.score - 100.0).abs() < 1e-6);
        assert_eq!(result.trust_level, TrustLevel::Verified);
    }

    #[test]
    fn zero_inputs_score_zero() {
        let now = Utc::now();
        let week_ago = now - Duration::hours(24 * 8);
        let result = TrustCalculator::score(0.0, CorroborationLevel::None, week_ago, now, Vec::new(), Vec::new());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.trust_level, TrustLevel::Unverified);
    }
}
