//! Validation acceptance/rejection audit trail, supplemented from the
//! original implementation's validation agent (spec SPEC_FULL.md §B.2):
//! every `CrossValidationResult` is paired with the accept/reject call and
//! the reasoning behind it, so a rejected article can be explained later.

use chrono::{DateTime, Utc};

use crate::trust::TrustLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationVerdict {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct ValidationDecision {
    pub article_id: String,
    pub verdict: ValidationVerdict,
    pub trust_level: TrustLevel,
    pub trust_score: f64,
    pub reasons: Vec<String>,
    pub decided_at: DateTime<Utc>,
}

/// Minimum trust score an article must clear to be accepted into L2.
/// Below `TrustLevel::Low` (40) an article is rejected outright; the
/// original validation agent's equivalent threshold.
pub const MIN_ACCEPTED_TRUST_SCORE: f64 = 40.0;

pub fn decide(
    article_id: impl Into<String>,
    trust_score: f64,
    trust_level: TrustLevel,
    contradiction_count: usize,
    now: DateTime<Utc>,
) -> ValidationDecision {
    let mut reasons = Vec::new();
    let verdict = if trust_score < MIN_ACCEPTED_TRUST_SCORE {
        reasons.push(format!("trust score {trust_score:.1} below minimum {MIN_ACCEPTED_TRUST_SCORE:.1}"));
        ValidationVerdict::Rejected
    } else if contradiction_count > 0 {
        reasons.push(format!("{contradiction_count} unresolved contradiction(s)"));
        ValidationVerdict::Rejected
    } else {
        reasons.push(format!("trust level {trust_level:?} at score {trust_score:.1}"));
        ValidationVerdict::Accepted
    };

    ValidationDecision {
        article_id: article_id.into(),
        verdict,
        trust_level,
        trust_score,
        reasons,
        decided_at: now,
    }
}
