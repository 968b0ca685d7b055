//! `SourceDescriptor`: the ingestion input the orchestrator schedules
//! against. No persisted "Source" entity exists in `newsroom_common`
//! beyond [`newsroom_common::SourceReputation`] (tracked reputation, not
//! the source's fetch address) — this mirrors how `newsroom-insights`
//! models `CompanyProfile` as run-input rather than a domain entity.

use newsroom_common::{SourceId, SourceTier, SourceType};

#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub source_id: SourceId,
    pub url: String,
    pub source_type: SourceType,
    pub tier: SourceTier,
}

impl SourceDescriptor {
    pub fn new(source_id: impl Into<String>, url: impl Into<String>, source_type: SourceType, tier: SourceTier) -> Self {
        Self { source_id: source_id.into(), url: url.into(), source_type, tier }
    }
}
