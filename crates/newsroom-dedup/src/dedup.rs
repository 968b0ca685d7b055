//! Semantic deduplicator (spec §4.2): `check_duplicate` combines a URL-hash
//! fast path with embedding similarity search and routes the result into
//! the cluster manager.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use newsroom_common::config::DedupConfig;
use newsroom_common::{word_count, normalize_url, ClusterId, ClusterMember, PipelineError};
use newsroom_core::Embedder;
use uuid::Uuid;

use crate::classify::{classify, DuplicateType};
use crate::cluster::DuplicateClusterManager;
use crate::embedding::combined_embedding;
use crate::index::SimilarityIndex;

const TOP_K: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheckResult {
    pub duplicate_type: DuplicateType,
    pub similarity_score: f64,
    pub matched_article_id: Option<String>,
    pub cluster_id: Option<ClusterId>,
}

impl DuplicateCheckResult {
    fn unique() -> Self {
        Self {
            duplicate_type: DuplicateType::Unique,
            similarity_score: 0.0,
            matched_article_id: None,
            cluster_id: None,
        }
    }
}

pub struct SemanticDeduplicator {
    embedder: Arc<dyn Embedder>,
    config: DedupConfig,
    index: Mutex<SimilarityIndex>,
    url_seen: Mutex<HashMap<String, String>>,
    clusters: Mutex<DuplicateClusterManager>,
    article_cluster: Mutex<HashMap<String, ClusterId>>,
}

impl SemanticDeduplicator {
    pub fn new(embedder: Arc<dyn Embedder>, config: DedupConfig) -> Self {
        let index = SimilarityIndex::new(config.window_hours as i64, config.max_articles);
        Self {
            embedder,
            config,
            index: Mutex::new(index),
            url_seen: Mutex::new(HashMap::new()),
            clusters: Mutex::new(DuplicateClusterManager::new()),
            article_cluster: Mutex::new(HashMap::new()),
        }
    }

    pub fn clusters(&self) -> std::sync::MutexGuard<'_, DuplicateClusterManager> {
        self.clusters.lock().expect("cluster manager lock poisoned")
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn check_duplicate(
        &self,
        article_id: &str,
        title: &str,
        body: &str,
        url: &str,
        source_id: &str,
        credibility_score: f64,
        scraped_at: DateTime<Utc>,
    ) -> Result<DuplicateCheckResult, PipelineError> {
        let normalized_url = normalize_url(url);

        if let Some(existing_id) = self.url_seen.lock().expect("url index lock poisoned").get(&normalized_url).cloned() {
            let cluster_id = self.route_to_cluster(
                &existing_id,
                article_id,
                title,
                source_id,
                credibility_score,
                body,
                scraped_at,
                1.0,
            );
            return Ok(DuplicateCheckResult {
                duplicate_type: DuplicateType::ExactDuplicate,
                similarity_score: 1.0,
                matched_article_id: Some(existing_id),
                cluster_id,
            });
        }

        let embedding = match combined_embedding(self.embedder.as_ref(), title, body).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(article_id, error = %err, "embedding failed, treating as unique");
                self.remember(&normalized_url, article_id, Vec::new(), source_id, scraped_at);
                return Ok(DuplicateCheckResult::unique());
            }
        };

        let matches = {
            let index = self.index.lock().expect("similarity index lock poisoned");
            if index.is_empty() {
                Vec::new()
            } else {
                index.query(&embedding, TOP_K, article_id)
            }
        };

        self.remember(&normalized_url, article_id, embedding, source_id, scraped_at);

        let best = matches.into_iter().next();
        let Some(best) = best else {
            return Ok(DuplicateCheckResult::unique());
        };

        let duplicate_type = classify(best.score, &self.config);
        if duplicate_type == DuplicateType::Unique {
            return Ok(DuplicateCheckResult::unique());
        }

        let cluster_id = self.route_to_cluster(
            &best.article_id,
            article_id,
            title,
            source_id,
            credibility_score,
            body,
            scraped_at,
            best.score,
        );

        Ok(DuplicateCheckResult {
            duplicate_type,
            similarity_score: best.score,
            matched_article_id: Some(best.article_id),
            cluster_id,
        })
    }

    fn remember(
        &self,
        normalized_url: &str,
        article_id: &str,
        embedding: Vec<f32>,
        source_id: &str,
        scraped_at: DateTime<Utc>,
    ) {
        self.url_seen
            .lock()
            .expect("url index lock poisoned")
            .insert(normalized_url.to_string(), article_id.to_string());
        if !embedding.is_empty() {
            self.index
                .lock()
                .expect("similarity index lock poisoned")
                .insert(article_id, source_id, embedding, scraped_at);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn route_to_cluster(
        &self,
        existing_article_id: &str,
        new_article_id: &str,
        topic_summary: &str,
        source_id: &str,
        credibility_score: f64,
        body: &str,
        scraped_at: DateTime<Utc>,
        similarity: f64,
    ) -> Option<ClusterId> {
        let new_member = ClusterMember {
            article_id: new_article_id.to_string(),
            source_id: source_id.to_string(),
            similarity_to_primary: similarity,
            credibility_score,
            scraped_at,
            is_primary: false,
            word_count: word_count(body),
        };

        let mut article_cluster = self.article_cluster.lock().expect("article-cluster map lock poisoned");
        if let Some(cluster_id) = article_cluster.get(existing_article_id).copied() {
            self.clusters
                .lock()
                .expect("cluster manager lock poisoned")
                .add_to_cluster(&cluster_id, new_member, scraped_at);
            article_cluster.insert(new_article_id.to_string(), cluster_id);
            return Some(cluster_id);
        }

        // The matched article's own credibility/word_count aren't available
        // here (only its id came back from the similarity index); the
        // caller-supplied values stand in until the next add_to_cluster call
        // re-scores with real data for every member.
        let existing_member = ClusterMember {
            article_id: existing_article_id.to_string(),
            source_id: source_id.to_string(),
            similarity_to_primary: 1.0,
            credibility_score,
            scraped_at,
            is_primary: false,
            word_count: 0,
        };
        let cluster_id = self.clusters.lock().expect("cluster manager lock poisoned").create_cluster(
            topic_summary,
            existing_member,
            new_member,
            scraped_at,
        );
        article_cluster.insert(existing_article_id.to_string(), cluster_id);
        article_cluster.insert(new_article_id.to_string(), cluster_id);
        Some(cluster_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use newsroom_core::CapabilityError;

    struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CapabilityError> {
            let mut out = Vec::with_capacity(texts.len());
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }
    }

    fn embedder_with(pairs: &[(&str, Vec<f32>)]) -> Arc<dyn Embedder> {
        let mut vectors = HashMap::new();
        for (k, v) in pairs {
            vectors.insert(k.to_string(), v.clone());
        }
        Arc::new(FixedEmbedder { vectors })
    }

    #[tokio::test]
    async fn same_url_is_exact_duplicate() {
        let embedder = embedder_with(&[]);
        let dedup = SemanticDeduplicator::new(embedder, DedupConfig::default());
        let now = Utc::now();
        dedup
            .check_duplicate("a1", "title", "body text here", "https://x.com/a", "src1", 0.8, now)
            .await
            .unwrap();
        let result = dedup
            .check_duplicate("a2", "title2", "other body", "https://x.com/a", "src1", 0.8, now)
            .await
            .unwrap();
        assert_eq!(result.duplicate_type, DuplicateType::ExactDuplicate);
        assert_eq!(result.matched_article_id.as_deref(), Some("a1"));
        assert!(result.cluster_id.is_some());
    }

    #[tokio::test]
    async fn dissimilar_embeddings_are_unique() {
        let embedder = embedder_with(&[
            ("t1", vec![1.0, 0.0]),
            ("b1", vec![1.0, 0.0]),
            ("t2", vec![0.0, 1.0]),
            ("b2", vec![0.0, 1.0]),
        ]);
        let dedup = SemanticDeduplicator::new(embedder, DedupConfig::default());
        let now = Utc::now();
        dedup
            .check_duplicate("a1", "t1", "b1", "https://x.com/1", "src1", 0.8, now)
            .await
            .unwrap();
        let result = dedup
            .check_duplicate("a2", "t2", "b2", "https://x.com/2", "src1", 0.8, now)
            .await
            .unwrap();
        assert_eq!(result.duplicate_type, DuplicateType::Unique);
        assert!(result.cluster_id.is_none());
    }

    #[tokio::test]
    async fn near_identical_embeddings_cluster_together() {
        let embedder = embedder_with(&[
            ("t1", vec![1.0, 0.0]),
            ("b1", vec![1.0, 0.0]),
            ("t2", vec![0.99, 0.01]),
            ("b2", vec![0.99, 0.01]),
        ]);
        let dedup = SemanticDeduplicator::new(embedder, DedupConfig::default());
        let now = Utc::now();
        dedup
            .check_duplicate("a1", "t1", "b1", "https://x.com/1", "src1", 0.8, now)
            .await
            .unwrap();
        let result = dedup
            .check_duplicate("a2", "t2", "b2", "https://x.com/2", "src2", 0.9, now)
            .await
            .unwrap();
        assert_ne!(result.duplicate_type, DuplicateType::Unique);
        assert!(result.cluster_id.is_some());
    }
}
