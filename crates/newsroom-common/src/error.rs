use thiserror::Error;

/// Abstract error taxonomy shared across every layer (spec §7).
///
/// Each variant is handled at the narrowest layer that can produce a
/// meaningful fallback; only [`PipelineError::InvalidInput`] and an
/// unrecoverable [`PipelineError::Storage`] are expected to propagate all
/// the way to a caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("transient network failure: {0}")]
    TransientNetwork(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("content invalid: {0}")]
    ContentInvalid(String),

    #[error("article rejected by quality filter: {0}")]
    QualityRejected(String),

    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Whether this error kind has a mandatory fallback path (spec §7:
    /// `DependencyUnavailable` must never propagate as a failure).
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            PipelineError::TransientNetwork(_)
                | PipelineError::RateLimited(_)
                | PipelineError::DependencyUnavailable(_)
        )
    }
}
