//! `BusinessImpactScorer`: orchestrates the multi-factor analyzer, sector
//! engine, and score aggregation into a single per-article result (spec
//! §4.4).

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use newsroom_common::ScoringProfile;

use crate::error::ImpactError;
use crate::factors::{EventSeverity, FactorScores, GeographicScope, MultiFactorAnalyzer};
use crate::score::{explain_priority, priority_rank, weights_for_profile, ImpactLevel, ProcessingGuidance, WeightConfig};
use crate::sector::{detect_event_type, CascadeEffect, IndustrySector, SectorAnalysisResult, SectorImpact, SectorImpactEngine};

#[derive(Debug, Clone)]
pub struct ScoringFactors {
    pub severity: f64,
    pub sector_relevance: f64,
    pub source_credibility: f64,
    pub geographic_scope: f64,
    pub temporal_urgency: f64,
    pub volume_momentum: f64,
}

#[derive(Debug, Clone)]
pub struct FactorContributions {
    pub severity: f64,
    pub sector_relevance: f64,
    pub source_credibility: f64,
    pub geographic_scope: f64,
    pub temporal_urgency: f64,
    pub volume_momentum: f64,
}

pub struct ImpactResult {
    pub impact_score: f64,
    pub impact_level: ImpactLevel,
    pub priority_rank: u8,
    pub factors: ScoringFactors,
    pub factor_contributions: FactorContributions,
    pub severity_level: EventSeverity,
    pub geographic_scope_kind: GeographicScope,
    pub primary_sectors: Vec<SectorImpact>,
    pub secondary_sectors: Vec<SectorImpact>,
    pub cascade_effects: Vec<CascadeEffect>,
    pub confidence: f64,
    pub detected_signals: Vec<String>,
    pub processing_guidance: ProcessingGuidance,
    pub scoring_profile: ScoringProfile,
    pub scored_at: DateTime<Utc>,
}

impl ImpactResult {
    pub fn requires_fast_track(&self) -> bool {
        self.priority_rank <= 2
    }

    pub fn requires_notification(&self) -> bool {
        self.priority_rank == 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScorerStatsSnapshot {
    pub articles_scored: u64,
    pub avg_score: f64,
    pub critical_count: u64,
    pub high_count: u64,
}

#[derive(Default)]
struct ScorerStats {
    articles_scored: u64,
    avg_score: f64,
    critical_count: u64,
    high_count: u64,
}

pub struct ScoreArticleInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub source: &'a str,
    pub published_at: Option<DateTime<Utc>>,
    pub mention_count: u32,
    pub target_sectors: Option<&'a [IndustrySector]>,
}

pub struct BusinessImpactScorer {
    scoring_profile: ScoringProfile,
    weights: WeightConfig,
    factor_analyzer: MultiFactorAnalyzer,
    sector_engine: SectorImpactEngine,
    stats: Mutex<ScorerStats>,
}

impl BusinessImpactScorer {
    pub fn new(scoring_profile: ScoringProfile) -> Result<Self, ImpactError> {
        Ok(Self {
            scoring_profile,
            weights: weights_for_profile(scoring_profile),
            factor_analyzer: MultiFactorAnalyzer::new(),
            sector_engine: SectorImpactEngine::new()?,
            stats: Mutex::new(ScorerStats::default()),
        })
    }

    pub fn with_custom_weights(scoring_profile: ScoringProfile, weights: WeightConfig) -> Result<Self, ImpactError> {
        Ok(Self {
            scoring_profile,
            weights,
            factor_analyzer: MultiFactorAnalyzer::new(),
            sector_engine: SectorImpactEngine::new()?,
            stats: Mutex::new(ScorerStats::default()),
        })
    }

    pub fn set_scoring_profile(&mut self, profile: ScoringProfile) {
        self.scoring_profile = profile;
        self.weights = weights_for_profile(profile);
    }

    pub fn score_article(&self, input: ScoreArticleInput<'_>, now: DateTime<Utc>) -> ImpactResult {
        let factor_scores = self.factor_analyzer.analyze(
            input.title,
            input.content,
            input.source,
            input.published_at,
            now,
            input.mention_count,
        );

        let event_type = detect_event_type(input.title, input.content);
        let sector_result =
            self.sector_engine.analyze_sectors(input.title, input.content, input.target_sectors, event_type);

        let (final_score, contributions) = aggregate(&factor_scores, &sector_result, &self.weights);
        let rank = priority_rank(final_score);

        self.record_stats(final_score);

        ImpactResult {
            impact_score: final_score,
            impact_level: ImpactLevel::from_score(final_score),
            priority_rank: rank,
            factors: ScoringFactors {
                severity: factor_scores.severity_score,
                sector_relevance: sector_result.overall_sector_score,
                source_credibility: factor_scores.credibility_score,
                geographic_scope: factor_scores.geographic_score,
                temporal_urgency: factor_scores.temporal_score,
                volume_momentum: factor_scores.volume_score,
            },
            factor_contributions: contributions,
            severity_level: factor_scores.severity_level,
            geographic_scope_kind: factor_scores.geographic_scope,
            primary_sectors: sector_result.primary_sectors,
            secondary_sectors: sector_result.secondary_sectors,
            cascade_effects: sector_result.cascade_effects,
            confidence: factor_scores.confidence,
            detected_signals: factor_scores.detected_signals,
            processing_guidance: explain_priority(rank),
            scoring_profile: self.scoring_profile,
            scored_at: now,
        }
    }

    fn record_stats(&self, score: f64) {
        let mut stats = self.stats.lock().expect("impact scorer stats lock poisoned");
        let n = stats.articles_scored as f64;
        stats.avg_score = (stats.avg_score * n + score) / (n + 1.0);
        stats.articles_scored += 1;
        if score >= 85.0 {
            stats.critical_count += 1;
        } else if score >= 70.0 {
            stats.high_count += 1;
        }
    }

    pub fn stats(&self) -> ScorerStatsSnapshot {
        let stats = self.stats.lock().expect("impact scorer stats lock poisoned");
        ScorerStatsSnapshot {
            articles_scored: stats.articles_scored,
            avg_score: stats.avg_score,
            critical_count: stats.critical_count,
            high_count: stats.high_count,
        }
    }
}

/// `final_score = clamp(0, 100, Σ(factor × weight) × confidence_adjustment)`
/// (spec §4.4); `confidence_adjustment` is the analyzer's own confidence,
/// computed from credibility, signal density, and severity.
fn aggregate(
    factors: &FactorScores,
    sector_result: &SectorAnalysisResult,
    weights: &WeightConfig,
) -> (f64, FactorContributions) {
    let contributions = FactorContributions {
        severity: factors.severity_score * weights.severity,
        sector_relevance: sector_result.overall_sector_score * weights.sector_relevance,
        source_credibility: factors.credibility_score * weights.source_credibility,
        geographic_scope: factors.geographic_score * weights.geographic_scope,
        temporal_urgency: factors.temporal_score * weights.temporal_urgency,
        volume_momentum: factors.volume_score * weights.volume_momentum,
    };

    let weighted_sum = contributions.severity
        + contributions.sector_relevance
        + contributions.source_credibility
        + contributions.geographic_scope
        + contributions.temporal_urgency
        + contributions.volume_momentum;

    let final_score = (weighted_sum * factors.confidence).clamp(0.0, 100.0);
    (final_score, contributions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(title: &'a str, content: &'a str) -> ScoreArticleInput<'a> {
        ScoreArticleInput {
            title,
            content,
            source: "wire_service",
            published_at: None,
            mention_count: 1,
            target_sectors: None,
        }
    }

    #[test]
    fn crisis_article_ranks_among_top_priorities() {
        let scorer = BusinessImpactScorer::new(ScoringProfile::Balanced).unwrap();
        let result = scorer.score_article(
            input(
                "Breaking: earthquake triggers nationwide state of emergency",
                "Casualties reported as rescue teams mobilize across the country.",
            ),
            Utc::now(),
        );
        assert!(result.priority_rank <= 2);
        assert!(result.requires_fast_track());
    }

    #[test]
    fn routine_article_ranks_low_priority() {
        let scorer = BusinessImpactScorer::new(ScoringProfile::Balanced).unwrap();
        let result = scorer.score_article(
            input("Local school holds annual science fair", "Students presented their projects to parents."),
            Utc::now(),
        );
        assert!(result.priority_rank >= 3);
        assert!(!result.requires_notification());
    }

    #[test]
    fn business_focused_profile_weights_sector_relevance_higher() {
        let balanced = BusinessImpactScorer::new(ScoringProfile::Balanced).unwrap();
        let business = BusinessImpactScorer::new(ScoringProfile::BusinessFocused).unwrap();
        let article = input(
            "Tea export industry expands overseas contracts",
            "Tea estate owners report record shipments to international buyers amid a fuel shortage and petrol queues.",
        );
        let balanced_result = balanced.score_article(
            ScoreArticleInput { target_sectors: None, ..input(article.title, article.content) },
            Utc::now(),
        );
        let business_result = business.score_article(
            ScoreArticleInput { target_sectors: None, ..input(article.title, article.content) },
            Utc::now(),
        );
        assert!(business_result.factor_contributions.sector_relevance >= balanced_result.factor_contributions.sector_relevance);
    }

    #[test]
    fn stats_track_running_average() {
        let scorer = BusinessImpactScorer::new(ScoringProfile::Balanced).unwrap();
        scorer.score_article(input("Quiet day", "Nothing of note happened."), Utc::now());
        scorer.score_article(input("Another quiet day", "Still nothing of note."), Utc::now());
        let stats = scorer.stats();
        assert_eq!(stats.articles_scored, 2);
    }
}
