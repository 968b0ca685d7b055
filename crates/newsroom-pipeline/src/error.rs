use thiserror::Error;

/// Errors surfaced by the pipeline orchestrator itself, as distinct from
/// [`newsroom_common::PipelineError`] which covers the per-article/
/// per-source failures already folded into `FeedbackSignal`s by the
/// stages (spec §7: a single article's failure never aborts a run).
#[derive(Error, Debug)]
pub enum PipelineRunError {
    #[error("source {0} exhausted its retry budget")]
    SourceExhausted(String),

    #[error("repository error: {0}")]
    Repository(String),

    #[error("run cancelled: {0:?}")]
    Cancelled(newsroom_core::cancel::CancelReason),

    #[error(transparent)]
    Upstream(#[from] newsroom_common::PipelineError),
}

impl From<newsroom_core::error::CapabilityError> for PipelineRunError {
    fn from(err: newsroom_core::error::CapabilityError) -> Self {
        PipelineRunError::Upstream(newsroom_common::PipelineError::Other(err.into()))
    }
}
