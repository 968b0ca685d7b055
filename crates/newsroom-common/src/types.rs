//! The shared data model (spec §3). Every payload is a named record with
//! enumerated fields; `details`/`metadata` extension maps stay as untyped
//! key-value bags because downstream layers sometimes carry source-specific
//! annotations that no upstream layer needs to understand.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ArticleId = String;
pub type SourceId = String;
pub type ClusterId = Uuid;
pub type IndicatorId = String;

// ---------------------------------------------------------------------------
// RawArticle
// ---------------------------------------------------------------------------

/// Immutable once created. Owned exclusively by L1; downstream layers read
/// but never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub article_id: ArticleId,
    pub source_id: SourceId,
    pub scrape_timestamp: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    pub url: String,
    /// Raw headers kept for cache revalidation (ETag, Last-Modified, …).
    pub raw_html_headers: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// SourceReputation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Official,
    Tier1,
    Tier2,
    Unknown,
    Blacklisted,
}

impl SourceTier {
    /// Base reputation score a newly-seen source of this tier starts at.
    pub fn base_score(self) -> f64 {
        match self {
            SourceTier::Official => 0.95,
            SourceTier::Tier1 => 0.80,
            SourceTier::Tier2 => 0.65,
            SourceTier::Unknown => 0.30,
            SourceTier::Blacklisted => 0.0,
        }
    }

    /// Reputation ceiling a source of this tier can grow into via
    /// corroboration (spec §4.3, `record_confirmation`).
    pub fn max_score(self) -> f64 {
        match self {
            SourceTier::Official => 1.0,
            SourceTier::Tier1 => 0.95,
            SourceTier::Tier2 => 0.85,
            SourceTier::Unknown => 0.60,
            SourceTier::Blacklisted => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReputation {
    pub source_id: SourceId,
    pub tier: SourceTier,
    pub reputation_score: f64,
    pub quality_score: f64,
    pub accepted_count: u64,
    pub rejected_count: u64,
    pub auto_disabled: bool,
    pub last_updated: DateTime<Utc>,
    pub history: Vec<ReputationHistoryPoint>,
}

impl SourceReputation {
    pub fn new(source_id: impl Into<String>, tier: SourceTier, now: DateTime<Utc>) -> Self {
        let score = tier.base_score();
        Self {
            source_id: source_id.into(),
            tier,
            reputation_score: score,
            quality_score: score,
            accepted_count: 0,
            rejected_count: 0,
            auto_disabled: false,
            last_updated: now,
            history: vec![ReputationHistoryPoint {
                timestamp: now,
                score,
            }],
        }
    }

    pub fn total_articles(&self) -> u64 {
        self.accepted_count + self.rejected_count
    }
}

// ---------------------------------------------------------------------------
// CacheEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    News,
    Government,
    Api,
    Social,
    Financial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source_id: SourceId,
    pub url: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_signature: String,
    pub article_count: usize,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// DuplicateCluster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterMember {
    pub article_id: ArticleId,
    pub source_id: SourceId,
    pub similarity_to_primary: f64,
    pub credibility_score: f64,
    pub scraped_at: DateTime<Utc>,
    pub is_primary: bool,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCluster {
    pub cluster_id: ClusterId,
    pub topic_summary: String,
    pub primary_article_id: ArticleId,
    pub members: Vec<ClusterMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DuplicateCluster {
    pub fn unique_sources(&self) -> BTreeSet<&str> {
        self.members.iter().map(|m| m.source_id.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// EnrichedArticle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PestelCategory {
    Political,
    Economic,
    Social,
    Technological,
    Environmental,
    Legal,
}

pub const PESTEL_CATEGORIES: [PestelCategory; 6] = [
    PestelCategory::Political,
    PestelCategory::Economic,
    PestelCategory::Social,
    PestelCategory::Technological,
    PestelCategory::Environmental,
    PestelCategory::Legal,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLevel {
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    VeryPositive,
}

impl SentimentLevel {
    /// Threshold classification per spec §4.5 item 2.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.5 {
            SentimentLevel::VeryPositive
        } else if score >= 0.05 {
            SentimentLevel::Positive
        } else if score <= -0.5 {
            SentimentLevel::VeryNegative
        } else if score <= -0.05 {
            SentimentLevel::Negative
        } else {
            SentimentLevel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Product,
    Event,
    Money,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub entity_type: EntityType,
    pub importance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            QualityBand::Excellent
        } else if score >= 65.0 {
            QualityBand::Good
        } else if score >= 40.0 {
            QualityBand::Fair
        } else {
            QualityBand::Poor
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedArticle {
    pub raw: RawArticle,
    pub pestel_category: PestelCategory,
    pub category_confidences: BTreeMap<String, f64>,
    pub urgency_level: UrgencyLevel,
    pub business_relevance: f64,
    pub sentiment_score: f64,
    pub sentiment_level: SentimentLevel,
    pub entities: Vec<Entity>,
    pub topic_id: Option<String>,
    pub quality_score: f64,
    pub quality_band: QualityBand,
}

// ---------------------------------------------------------------------------
// IndicatorDefinition / IndicatorValue / IndicatorEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    FrequencyCount,
    SentimentAggregate,
    NumericExtraction,
    Composite,
    Ratio,
    WeightedAverage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorThresholds {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    pub indicator_id: IndicatorId,
    pub indicator_name: String,
    pub pestel_category: PestelCategory,
    pub calculation_type: CalculationType,
    pub keywords: Vec<String>,
    pub base_weight: f64,
    pub thresholds: IndicatorThresholds,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorValue {
    pub indicator_id: IndicatorId,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub confidence: f64,
    pub article_count: usize,
    pub source_articles: Vec<ArticleId>,
    pub raw_count: usize,
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorEventType {
    ThresholdBreach,
    Anomaly,
    RapidChange,
    CorrelationBreak,
    DataQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorEvent {
    pub event_id: Uuid,
    pub indicator_id: IndicatorId,
    pub timestamp: DateTime<Utc>,
    pub event_type: IndicatorEventType,
    pub severity: Severity,
    pub value_before: f64,
    pub value_after: f64,
    pub acknowledged: bool,
}

// ---------------------------------------------------------------------------
// TrendResult / ForecastPoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    StrongRising,
    Rising,
    WeakRising,
    Stable,
    WeakFalling,
    Falling,
    StrongFalling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub indicator_id: IndicatorId,
    pub window_days: u32,
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    pub p_value: f64,
    pub volatility: f64,
    pub momentum: f64,
    pub is_significant: bool,
    pub seasonality_detected: bool,
    pub change_points: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    Linear,
    ExponentialSmoothing,
    HoltLinear,
    WeightedAverage,
    Ensemble,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub days_ahead: u32,
    pub forecast_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
    pub method: ForecastMethod,
}

// ---------------------------------------------------------------------------
// DetectedRisk / DetectedOpportunity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    RuleBased,
    Pattern,
    Ml,
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    /// Boundaries are closed-below (spec §8 invariant 5).
    pub fn from_final_score(score: f64) -> Self {
        if score >= 40.0 {
            SeverityLevel::Critical
        } else if score >= 30.0 {
            SeverityLevel::High
        } else if score >= 15.0 {
            SeverityLevel::Medium
        } else {
            SeverityLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedRisk {
    pub code: String,
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub probability: f64,
    pub impact: f64,
    pub urgency: u8,
    pub confidence: f64,
    pub final_score: f64,
    pub severity_level: SeverityLevel,
    pub triggering_indicators: BTreeMap<IndicatorId, f64>,
    pub detection_method: DetectionMethod,
    pub reasoning: String,
    pub requires_immediate_action: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedOpportunity {
    pub code: String,
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub probability: f64,
    pub impact: f64,
    pub urgency: u8,
    pub confidence: f64,
    pub final_score: f64,
    pub severity_level: SeverityLevel,
    pub triggering_indicators: BTreeMap<IndicatorId, f64>,
    pub detection_method: DetectionMethod,
    pub reasoning: String,
    pub requires_immediate_action: bool,
}

/// `final_score = probability × impact × urgency × confidence` (spec §3,
/// invariant 4). Shared by risks and opportunities.
pub fn compute_final_score(probability: f64, impact: f64, urgency: u8, confidence: f64) -> f64 {
    probability * impact * f64::from(urgency) * confidence
}

// ---------------------------------------------------------------------------
// FeedbackSignal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    // usage
    ArticleUsed,
    ArticleDiscarded,
    // quality
    ArticleDiscardedLowQuality,
    ContentCorrupted,
    // relevance
    IndicatorMatchConfirmed,
    IndicatorMatchRejected,
    TopicMisclassified,
    // accuracy
    SentimentMismatch,
    EntityMismatch,
    ForecastInaccurate,
    // source reliability
    SourceReliableTrue,
    SourceReliableFalse,
    DuplicateConfirmed,
    DuplicateRejected,
    CorroborationConfirmed,
    CorroborationContradicted,
    // risk/insight
    RiskConfirmed,
    RiskFalsePositive,
    OpportunityConfirmed,
    OpportunityFalsePositive,
    // manual
    ManualOverride,
    ManualAnnotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSignal {
    pub feedback_type: FeedbackType,
    pub severity: Severity,
    pub source_layer: String,
    pub article_id: Option<ArticleId>,
    pub source_id: Option<SourceId>,
    pub quality_rating: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub details: BTreeMap<String, serde_json::Value>,
}

impl FeedbackSignal {
    pub fn new(feedback_type: FeedbackType, source_layer: impl Into<String>) -> Self {
        Self {
            feedback_type,
            severity: Severity::Low,
            source_layer: source_layer.into(),
            article_id: None,
            source_id: None,
            quality_rating: None,
            timestamp: Utc::now(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_article(mut self, article_id: impl Into<String>) -> Self {
        self.article_id = Some(article_id.into());
        self
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_quality(mut self, rating: f64) -> Self {
        self.quality_rating = Some(rating);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_level_thresholds() {
        assert_eq!(SentimentLevel::from_score(0.6), SentimentLevel::VeryPositive);
        assert_eq!(SentimentLevel::from_score(0.1), SentimentLevel::Positive);
        assert_eq!(SentimentLevel::from_score(0.0), SentimentLevel::Neutral);
        assert_eq!(SentimentLevel::from_score(-0.1), SentimentLevel::Negative);
        assert_eq!(SentimentLevel::from_score(-0.6), SentimentLevel::VeryNegative);
    }

    #[test]
    fn severity_boundaries_closed_below() {
        assert_eq!(SeverityLevel::from_final_score(40.0), SeverityLevel::Critical);
        assert_eq!(SeverityLevel::from_final_score(39.999), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_final_score(30.0), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_final_score(15.0), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::from_final_score(14.999), SeverityLevel::Low);
    }

    #[test]
    fn final_score_matches_product() {
        let score = compute_final_score(0.80, 7.0, 4, 0.85);
        assert!((score - 19.04).abs() < 1e-9);
    }
}
