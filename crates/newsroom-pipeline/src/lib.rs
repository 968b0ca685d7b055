//! L1-L4 orchestration: per-source ingestion, enrichment and validation,
//! indicator aggregation, and business insight generation, wired into one
//! staged pipeline over bounded channels (spec §5).

pub mod concurrency;
pub mod error;
pub mod retry;
pub mod run;
pub mod runtime;
pub mod source;
pub mod stages;

pub use concurrency::ConcurrencyLimiter;
pub use error::PipelineRunError;
pub use retry::{retry_with_backoff, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_MS};
pub use run::{request_shutdown, PipelineRun, PipelineRunSummary};
pub use runtime::PipelineRuntime;
pub use source::SourceDescriptor;
pub use stages::{EnrichStage, IndicatorStage, IngestStage, InsightStage};
