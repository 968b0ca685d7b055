use thiserror::Error;

/// Narrow error type for capability adapters (scraper, embedder, LLM).
/// Collapsed into [`newsroom_common::PipelineError`] at the pipeline
/// boundary.
#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("upstream error: {0}")]
    Upstream(String),
}
