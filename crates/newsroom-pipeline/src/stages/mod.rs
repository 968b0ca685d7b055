pub mod enrich;
pub mod indicators;
pub mod ingest;
pub mod insights;

pub use enrich::EnrichStage;
pub use indicators::IndicatorStage;
pub use ingest::IngestStage;
pub use insights::InsightStage;
