pub mod error;
pub mod feedback;
pub mod metrics;
pub mod orchestrator;
pub mod tuner;

pub use error::LearningError;
pub use feedback::{
    FeedbackAggregation, FeedbackLoop, ReputationAdjustment, AGGREGATION_DECAY_HOURS, REPUTATION_UPDATE_THRESHOLD,
    SIGNAL_RETENTION_HOURS,
};
pub use metrics::{MetricsSnapshot, MetricsTracker, SourceMetrics};
pub use orchestrator::{LearningCycleResult, LearningOrchestrator, DEFAULT_CYCLE_INTERVAL_SECONDS};
pub use tuner::{AutoTuner, TunedParameters, DEFAULT_CONCURRENCY, DEFAULT_QUALITY_THRESHOLD};
