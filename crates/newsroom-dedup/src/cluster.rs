//! Duplicate cluster management and primary-article election (spec §4.2
//! "Primary-article selection within a cluster"):
//! `score = credibility×40 + (word_count / max_word_count)×30 + max(0, 30 − age_hours×2)`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use newsroom_common::{ClusterId, ClusterMember, DuplicateCluster};
use uuid::Uuid;

pub struct DuplicateClusterManager {
    clusters: BTreeMap<ClusterId, DuplicateCluster>,
}

impl Default for DuplicateClusterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateClusterManager {
    pub fn new() -> Self {
        Self {
            clusters: BTreeMap::new(),
        }
    }

    pub fn get(&self, cluster_id: &ClusterId) -> Option<&DuplicateCluster> {
        self.clusters.get(cluster_id)
    }

    /// Create a new cluster seeded with the matched existing article and
    /// the newly-ingested one (spec §4.2 step 5: "if best match has no
    /// cluster, create one with both articles").
    pub fn create_cluster(
        &mut self,
        topic_summary: impl Into<String>,
        existing: ClusterMember,
        new_member: ClusterMember,
        now: DateTime<Utc>,
    ) -> ClusterId {
        let cluster_id = Uuid::new_v4();
        let mut cluster = DuplicateCluster {
            cluster_id,
            topic_summary: topic_summary.into(),
            primary_article_id: existing.article_id.clone(),
            members: vec![existing, new_member],
            created_at: now,
            updated_at: now,
        };
        elect_primary(&mut cluster, now);
        self.clusters.insert(cluster_id, cluster);
        cluster_id
    }

    /// Add a member to an existing cluster, re-electing the primary.
    pub fn add_to_cluster(
        &mut self,
        cluster_id: &ClusterId,
        member: ClusterMember,
        now: DateTime<Utc>,
    ) -> Option<()> {
        let cluster = self.clusters.get_mut(cluster_id)?;
        cluster.members.retain(|m| m.article_id != member.article_id);
        cluster.members.push(member);
        cluster.updated_at = now;
        elect_primary(cluster, now);
        Some(())
    }
}

fn primary_score(member: &ClusterMember, max_word_count: usize, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - member.scraped_at).num_minutes() as f64 / 60.0;
    let word_ratio = if max_word_count == 0 {
        0.0
    } else {
        member.word_count as f64 / max_word_count as f64
    };
    member.credibility_score * 40.0 + word_ratio * 30.0 + (30.0 - age_hours * 2.0).max(0.0)
}

/// Re-scores every member and marks exactly one `is_primary = true`.
fn elect_primary(cluster: &mut DuplicateCluster, now: DateTime<Utc>) {
    let max_word_count = cluster.members.iter().map(|m| m.word_count).max().unwrap_or(0);
    let winner = cluster
        .members
        .iter()
        .enumerate()
        .map(|(i, m)| (i, primary_score(m, max_word_count, now)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i);

    for (i, member) in cluster.members.iter_mut().enumerate() {
        member.is_primary = Some(i) == winner;
    }
    if let Some(i) = winner {
        cluster.primary_article_id = cluster.members[i].article_id.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(article_id: &str, credibility: f64, words: usize, age_hours: i64) -> ClusterMember {
        ClusterMember {
            article_id: article_id.to_string(),
            source_id: "src".to_string(),
            similarity_to_primary: 1.0,
            credibility_score: credibility,
            scraped_at: Utc::now() - chrono::Duration::hours(age_hours),
            is_primary: false,
            word_count: words,
        }
    }

    #[test]
    fn higher_credibility_and_length_wins_primary() {
        let mut manager = DuplicateClusterManager::new();
        let now = Utc::now();
        let weak = member("a1", 0.5, 100, 0);
        let strong = member("a2", 0.9, 500, 0);
        let cluster_id = manager.create_cluster("rates hike", weak, strong, now);
        let cluster = manager.get(&cluster_id).unwrap();
        assert_eq!(cluster.primary_article_id, "a2");
        assert_eq!(cluster.members.iter().filter(|m| m.is_primary).count(), 1);
    }

    #[test]
    fn older_article_loses_to_fresher_equal_quality() {
        let mut manager = DuplicateClusterManager::new();
        let now = Utc::now();
        let old = member("a1", 0.8, 300, 40);
        let fresh = member("a2", 0.8, 300, 0);
        let cluster_id = manager.create_cluster("topic", old, fresh, now);
        let cluster = manager.get(&cluster_id).unwrap();
        assert_eq!(cluster.primary_article_id, "a2");
    }

    #[test]
    fn add_to_cluster_reelects_primary() {
        let mut manager = DuplicateClusterManager::new();
        let now = Utc::now();
        let a = member("a1", 0.6, 200, 0);
        let b = member("a2", 0.6, 200, 0);
        let cluster_id = manager.create_cluster("topic", a, b, now);
        let better = member("a3", 0.99, 900, 0);
        manager.add_to_cluster(&cluster_id, better, now).unwrap();
        let cluster = manager.get(&cluster_id).unwrap();
        assert_eq!(cluster.primary_article_id, "a3");
        assert_eq!(cluster.members.len(), 3);
    }
}
