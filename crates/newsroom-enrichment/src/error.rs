use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("no API keys configured for LLM-backed enrichment stages")]
    NoKeysConfigured,
}
