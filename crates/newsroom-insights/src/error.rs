use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("no indicator values supplied for company {0}")]
    NoIndicatorData(String),
    #[error("llm narrative enhancement failed: {0}")]
    LlmEnhancementFailed(String),
}
