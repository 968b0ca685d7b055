pub mod classify;
pub mod entities;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod quality;
pub mod sentiment;

pub use classify::{
    pestel_category_for, ClassificationMethod, HybridClassifier, IndicatorPrediction, MlClassifier,
    NoopMlClassifier, RuleBasedClassifier, INDICATOR_IDS,
};
pub use entities::extract_entities;
pub use error::EnrichmentError;
pub use keys::{KeyOutcome, KeyRotationManager};
pub use pipeline::EnrichmentPipeline;
pub use quality::{QualityDimensions, QualityResult, QualityScorer, QualityWeights};
pub use sentiment::{analyze_article_sentiment, blend_article_sentiment, LexiconSentimentBackend, SentimentBackend, SentimentResult};
