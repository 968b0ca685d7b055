pub mod config;
pub mod error;
pub mod quality;
pub mod types;

pub use config::{
    DedupConfig, LearningConfig, LearningMode, LlmConfig, PipelineConfig, ScoringProfile,
    SourceTtls,
};
pub use error::PipelineError;
pub use quality::*;
pub use types::*;

/// Normalize a URL into a stable cache/dedup key: lowercase scheme+host,
/// strip a trailing slash, drop the fragment. Query strings are kept since
/// some sources encode the article id there.
pub fn normalize_url(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let trimmed = without_fragment.trim_end_matches('/');
    trimmed.to_lowercase()
}
