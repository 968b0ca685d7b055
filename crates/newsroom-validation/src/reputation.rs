//! Source reputation tracking (spec §4.3 "SourceReputationTracker").
//! Reputation writes are serialized per source (spec invariant) — callers
//! are expected to hold this behind a per-source lock or actor; the pure
//! scoring functions here don't themselves serialize anything.

use newsroom_common::{SourceReputation, SourceTier};

/// `AUTO_DISABLE_REPUTATION_THRESHOLD` / `AUTO_DISABLE_MIN_OBSERVATIONS`
/// resolve the spec's auto-disable Open Question: a single global threshold
/// plus a minimum observation count, independent of tier.
pub const AUTO_DISABLE_REPUTATION_THRESHOLD: f64 = 0.40;
pub const AUTO_DISABLE_MIN_OBSERVATIONS: u64 = 20;

fn tier_max(tier: SourceTier) -> f64 {
    tier.max_score()
}

/// `min(0.02 × len(corroborators), 0.05) + (0.01 if was_first else 0)`,
/// capped at the tier's maximum.
pub fn record_confirmation(reputation: &mut SourceReputation, corroborators: usize, was_first: bool) {
    let gain = (0.02 * corroborators as f64).min(0.05) + if was_first { 0.01 } else { 0.0 };
    let cap = tier_max(reputation.tier);
    reputation.reputation_score = (reputation.reputation_score + gain).min(cap);
    reputation.accepted_count += 1;
    apply_auto_disable(reputation);
}

/// `min(0.03 × len(contradictors), 0.08)`.
pub fn record_contradiction(reputation: &mut SourceReputation, contradictors: usize) {
    let loss = (0.03 * contradictors as f64).min(0.08);
    reputation.reputation_score = (reputation.reputation_score - loss).max(0.0);
    reputation.rejected_count += 1;
    apply_auto_disable(reputation);
}

/// Applies a small incremental adjustment (e.g. from downstream feedback
/// aggregation, spec §4.8) rather than a confirmation/contradiction event —
/// clamped to the tier's `[0, max_score]` range.
pub fn adjust_reputation(reputation: &mut SourceReputation, delta: f64) {
    let cap = tier_max(reputation.tier);
    reputation.reputation_score = (reputation.reputation_score + delta).clamp(0.0, cap);
    apply_auto_disable(reputation);
}

fn apply_auto_disable(reputation: &mut SourceReputation) {
    let observations = reputation.accepted_count + reputation.rejected_count;
    if reputation.reputation_score < AUTO_DISABLE_REPUTATION_THRESHOLD
        && observations >= AUTO_DISABLE_MIN_OBSERVATIONS
    {
        reputation.auto_disabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reputation(tier: SourceTier) -> SourceReputation {
        SourceReputation::new("src-1".to_string(), tier, Utc::now())
    }

    #[test]
    fn confirmation_gain_capped_at_005_plus_first_bonus() {
        let mut rep = reputation(SourceTier::Tier1);
        rep.reputation_score = 0.5;
        record_confirmation(&mut rep, 10, true);
        assert!((rep.reputation_score - 0.56).abs() < 1e-9);
    }

    #[test]
    fn confirmation_gain_capped_at_tier_maximum() {
        let mut rep = reputation(SourceTier::Tier2);
        rep.reputation_score = 0.84;
        record_confirmation(&mut rep, 5, false);
        assert_eq!(rep.reputation_score, SourceTier::Tier2.max_score());
    }

    #[test]
    fn contradiction_loss_capped_at_008() {
        let mut rep = reputation(SourceTier::Tier1);
        rep.reputation_score = 0.5;
        record_contradiction(&mut rep, 10);
        assert!((rep.reputation_score - 0.42).abs() < 1e-9);
    }

    #[test]
    fn auto_disables_below_threshold_with_enough_observations() {
        let mut rep = reputation(SourceTier::Unknown);
        rep.reputation_score = 0.41;
        rep.accepted_count = 19;
        record_contradiction(&mut rep, 1);
        assert_eq!(rep.accepted_count + rep.rejected_count, 20);
        assert!(rep.auto_disabled);
    }

    #[test]
    fn stays_enabled_below_threshold_with_too_few_observations() {
        let mut rep = reputation(SourceTier::Unknown);
        rep.reputation_score = 0.1;
        record_contradiction(&mut rep, 1);
        assert!(!rep.auto_disabled);
    }

    #[test]
    fn adjust_reputation_clamps_to_tier_ceiling() {
        let mut rep = reputation(SourceTier::Tier2);
        rep.reputation_score = SourceTier::Tier2.max_score() - 0.01;
        adjust_reputation(&mut rep, 0.05);
        assert_eq!(rep.reputation_score, SourceTier::Tier2.max_score());
    }

    #[test]
    fn adjust_reputation_clamps_to_zero_floor() {
        let mut rep = reputation(SourceTier::Unknown);
        rep.reputation_score = 0.01;
        adjust_reputation(&mut rep, -0.05);
        assert_eq!(rep.reputation_score, 0.0);
    }
}
