pub mod error;
pub mod factors;
pub mod score;
pub mod scorer;
pub mod sector;

pub use error::ImpactError;
pub use factors::{EventSeverity, FactorScores, GeographicScope, MultiFactorAnalyzer};
pub use score::{explain_priority, priority_rank, weights_for_profile, ImpactLevel, ProcessingGuidance, WeightConfig};
pub use scorer::{BusinessImpactScorer, ImpactResult, ScoreArticleInput, ScoringFactors};
pub use sector::{detect_event_type, CascadeEffect, EventType, IndustrySector, SectorAnalysisResult, SectorGraph, SectorImpact, SectorImpactEngine, ALL_SECTORS};
