//! Capability traits for the external collaborators named in spec §6.
//! Each is a small interface with a runtime-selected implementation —
//! never an inheritance tree (spec §9 "Polymorphism over scrapers...").

use async_trait::async_trait;

use newsroom_common::RawArticle;

use crate::error::CapabilityError;

/// `fetch(source_id, url) -> RawArticle* | Error` (spec §6).
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn fetch(
        &self,
        source_id: &str,
        url: &str,
    ) -> Result<Vec<RawArticle>, CapabilityError>;
}

pub const EMBEDDING_DIM: usize = 384;

/// `embed(text) -> vec384` (unit-normalised), with a batch variant
/// (spec §6).
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CapabilityError>;
}

/// Unit-normalise a vector in place; a zero vector is left as-is (callers
/// treat an all-zero embedding as "no signal", never divide by zero).
pub fn normalize_embedding(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Outcome of an LLM invocation. `source` distinguishes a genuine model
/// response from the mandatory rule-based fallback (spec §8: "All API keys
/// rate-limited ⇒ LLM call returns structured fallback with
/// `source = "fallback"`, not null and not an exception").
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub source: LlmResponseSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmResponseSource {
    Model,
    Fallback,
}

/// `invoke(system, user) -> json | raw_text` with automatic retry/rotation
/// handled internally (spec §6). Implementations must never raise on
/// exhausted quota — they fall back instead (spec §7 DependencyUnavailable).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, system: &str, user: &str) -> LlmResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_embedding_unit_length() {
        let mut v = vec![3.0_f32, 4.0];
        normalize_embedding(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_embedding_zero_vector_untouched() {
        let mut v = vec![0.0_f32; 4];
        normalize_embedding(&mut v);
        assert_eq!(v, vec![0.0_f32; 4]);
    }
}
