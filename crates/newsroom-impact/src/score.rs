//! Score aggregation (spec §4.4 "Aggregation"): per-profile factor weights,
//! the final weighted score, priority rank, and processing guidance. The
//! five weight profiles correspond to `newsroom_common::ScoringProfile`;
//! concrete weights aren't pinned by the source implementation (its
//! `score_aggregator` module wasn't part of the retrieved corpus) so they
//! are chosen here to match each profile's name, each summing to 1.0.

use newsroom_common::ScoringProfile;

#[derive(Debug, Clone, Copy)]
pub struct WeightConfig {
    pub severity: f64,
    pub sector_relevance: f64,
    pub source_credibility: f64,
    pub geographic_scope: f64,
    pub temporal_urgency: f64,
    pub volume_momentum: f64,
}

pub fn weights_for_profile(profile: ScoringProfile) -> WeightConfig {
    match profile {
        ScoringProfile::Balanced => WeightConfig {
            severity: 0.25,
            sector_relevance: 0.20,
            source_credibility: 0.15,
            geographic_scope: 0.15,
            temporal_urgency: 0.15,
            volume_momentum: 0.10,
        },
        ScoringProfile::UrgencyFocused => WeightConfig {
            severity: 0.20,
            sector_relevance: 0.15,
            source_credibility: 0.10,
            geographic_scope: 0.10,
            temporal_urgency: 0.35,
            volume_momentum: 0.10,
        },
        ScoringProfile::BusinessFocused => WeightConfig {
            severity: 0.15,
            sector_relevance: 0.35,
            source_credibility: 0.10,
            geographic_scope: 0.10,
            temporal_urgency: 0.10,
            volume_momentum: 0.20,
        },
        ScoringProfile::CredibilityFocused => WeightConfig {
            severity: 0.15,
            sector_relevance: 0.15,
            source_credibility: 0.40,
            geographic_scope: 0.10,
            temporal_urgency: 0.10,
            volume_momentum: 0.10,
        },
        ScoringProfile::Comprehensive => WeightConfig {
            severity: 1.0 / 6.0,
            sector_relevance: 1.0 / 6.0,
            source_credibility: 1.0 / 6.0,
            geographic_scope: 1.0 / 6.0,
            temporal_urgency: 1.0 / 6.0,
            volume_momentum: 1.0 / 6.0,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
}

impl ImpactLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            ImpactLevel::Critical
        } else if score >= 70.0 {
            ImpactLevel::High
        } else if score >= 50.0 {
            ImpactLevel::Medium
        } else if score >= 30.0 {
            ImpactLevel::Low
        } else {
            ImpactLevel::Minimal
        }
    }
}

/// Priority rank 1 (highest) through 5, closed-below (spec §4.4).
pub fn priority_rank(score: f64) -> u8 {
    if score >= 85.0 {
        1
    } else if score >= 70.0 {
        2
    } else if score >= 50.0 {
        3
    } else if score >= 30.0 {
        4
    } else {
        5
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingGuidance {
    pub description: String,
    pub requires_fast_track: bool,
    pub requires_notification: bool,
}

pub fn explain_priority(rank: u8) -> ProcessingGuidance {
    let (description, fast_track, notify) = match rank {
        1 => ("critical: route for immediate review and notify on-call", true, true),
        2 => ("high: fast-track through enrichment and indicator aggregation", true, false),
        3 => ("medium: process on the standard schedule", false, false),
        4 => ("low: process with the standard schedule, no escalation", false, false),
        _ => ("minimal: informational only", false, false),
    };
    ProcessingGuidance {
        description: description.to_string(),
        requires_fast_track: fast_track,
        requires_notification: notify,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_profiles_sum_to_one() {
        for profile in [
            ScoringProfile::Balanced,
            ScoringProfile::UrgencyFocused,
            ScoringProfile::BusinessFocused,
            ScoringProfile::CredibilityFocused,
            ScoringProfile::Comprehensive,
        ] {
            let w = weights_for_profile(profile);
            let sum = w.severity
                + w.sector_relevance
                + w.source_credibility
                + w.geographic_scope
                + w.temporal_urgency
                + w.volume_momentum;
            assert!((sum - 1.0).abs() < 1e-9, "{profile:?} weights sum to {sum}");
        }
    }

    #[test]
    fn priority_rank_boundaries_closed_below() {
        assert_eq!(priority_rank(85.0), 1);
        assert_eq!(priority_rank(84.999), 2);
        assert_eq!(priority_rank(70.0), 2);
        assert_eq!(priority_rank(50.0), 3);
        assert_eq!(priority_rank(30.0), 4);
        assert_eq!(priority_rank(29.999), 5);
    }

    #[test]
    fn rank_one_requires_fast_track_and_notification() {
        let guidance = explain_priority(1);
        assert!(guidance.requires_fast_track);
        assert!(guidance.requires_notification);
    }

    #[test]
    fn rank_three_requires_neither() {
        let guidance = explain_priority(3);
        assert!(!guidance.requires_fast_track);
        assert!(!guidance.requires_notification);
    }
}
