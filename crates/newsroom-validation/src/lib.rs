pub mod claims;
pub mod corroboration;
pub mod decision;
pub mod reputation;
pub mod trust;

pub use claims::{Claim, ClaimExtractor, ClaimKind};
pub use corroboration::{CorroborationEngine, CorroborationLevel, CorroborationOutcome};
pub use decision::{decide, ValidationDecision, ValidationVerdict, MIN_ACCEPTED_TRUST_SCORE};
pub use reputation::{
    adjust_reputation, record_confirmation, record_contradiction, AUTO_DISABLE_MIN_OBSERVATIONS,
    AUTO_DISABLE_REPUTATION_THRESHOLD,
};
pub use trust::{freshness_weight, CrossValidationResult, TrustCalculator, TrustLevel};
