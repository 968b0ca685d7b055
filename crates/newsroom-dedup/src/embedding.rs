//! Combined title/body embedding for the similarity index (spec §4.2.2):
//! `normalize(weighted_avg(embed(title)×0.4, embed(body)×0.6))`.

use newsroom_core::{normalize_embedding, CapabilityError, Embedder, EMBEDDING_DIM};

const TITLE_WEIGHT: f32 = 0.4;
const BODY_WEIGHT: f32 = 0.6;

pub async fn combined_embedding(
    embedder: &dyn Embedder,
    title: &str,
    body: &str,
) -> Result<Vec<f32>, CapabilityError> {
    let title_vec = embedder.embed(title).await?;
    let body_vec = embedder.embed(body).await?;
    Ok(weighted_combine(&title_vec, &body_vec))
}

fn weighted_combine(title_vec: &[f32], body_vec: &[f32]) -> Vec<f32> {
    let dim = title_vec.len().max(body_vec.len()).max(EMBEDDING_DIM);
    let mut combined = vec![0.0f32; dim];
    for (i, slot) in combined.iter_mut().enumerate() {
        let t = title_vec.get(i).copied().unwrap_or(0.0);
        let b = body_vec.get(i).copied().unwrap_or(0.0);
        *slot = t * TITLE_WEIGHT + b * BODY_WEIGHT;
    }
    normalize_embedding(&mut combined);
    combined
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_embedding_is_unit_normalized() {
        let title = vec![1.0f32, 0.0, 0.0];
        let body = vec![0.0f32, 1.0, 0.0];
        let combined = weighted_combine(&title, &body);
        let norm: f32 = combined.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![0.6f32, 0.8, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orthogonal_vectors_have_zero_similarity() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }
}
