//! Corroboration engine (spec §4.3 "CorroborationEngine"): a rolling cache
//! of per-article claim fingerprints, queried to classify how strongly an
//! incoming article's claims are echoed elsewhere.

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use newsroom_common::SourceTier;

use crate::claims::Claim;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorroborationLevel {
    None,
    Weak,
    Moderate,
    Strong,
    Verified,
}

#[derive(Debug, Clone)]
pub struct CorroborationOutcome {
    pub level: CorroborationLevel,
    pub matching_article_ids: Vec<String>,
    pub distinct_sources: usize,
}

struct FingerprintRecord {
    article_id: String,
    source_id: String,
    tier: SourceTier,
    fingerprints: BTreeSet<String>,
    recorded_at: DateTime<Utc>,
}

pub struct CorroborationEngine {
    window_hours: i64,
    records: Mutex<Vec<FingerprintRecord>>,
}

impl CorroborationEngine {
    pub fn new(window_hours: i64) -> Self {
        Self {
            window_hours,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Classify `claims` against the rolling cache, then record this
    /// article's fingerprints for future lookups.
    pub fn corroborate(
        &self,
        article_id: &str,
        source_id: &str,
        tier: SourceTier,
        claims: &[Claim],
        now: DateTime<Utc>,
    ) -> CorroborationOutcome {
        let fingerprints: BTreeSet<String> = claims.iter().map(|c| c.fingerprint.clone()).collect();
        let mut records = self.records.lock().expect("corroboration cache lock poisoned");

        let cutoff = now - chrono::Duration::hours(self.window_hours);
        records.retain(|r| r.recorded_at >= cutoff);

        let mut matching_article_ids = Vec::new();
        let mut matching_sources = BTreeSet::new();
        let mut has_official = false;
        for record in records.iter() {
            if record.article_id == article_id {
                continue;
            }
            if record.fingerprints.intersection(&fingerprints).next().is_some() {
                matching_article_ids.push(record.article_id.clone());
                matching_sources.insert(record.source_id.clone());
                if record.tier == SourceTier::Official {
                    has_official = true;
                }
            }
        }

        records.push(FingerprintRecord {
            article_id: article_id.to_string(),
            source_id: source_id.to_string(),
            tier,
            fingerprints,
            recorded_at: now,
        });

        let matches = matching_article_ids.len();
        let distinct_sources = matching_sources.len();
        let level = classify_corroboration(matches, distinct_sources, has_official);

        CorroborationOutcome {
            level,
            matching_article_ids,
            distinct_sources,
        }
    }
}

/// `none | weak (1 match) | moderate (2-3 across ≥2 sources) | strong
/// (≥4 across ≥3 sources) | verified (≥4 including an official source)`.
fn classify_corroboration(matches: usize, distinct_sources: usize, has_official: bool) -> CorroborationLevel {
    if matches == 0 {
        CorroborationLevel::None
    } else if matches >= 4 && has_official {
        CorroborationLevel::Verified
    } else if matches >= 4 && distinct_sources >= 3 {
        CorroborationLevel::Strong
    } else if matches >= 2 && distinct_sources >= 2 {
        CorroborationLevel::Moderate
    } else {
        CorroborationLevel::Weak
    }
}
