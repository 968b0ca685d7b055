pub mod detector;
pub mod metrics;
pub mod normalize;
pub mod reason;
pub mod smart_cache;

pub use detector::{ChangeDetector, HeadResult, HttpChangeDetector, RssMeta};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use normalize::{content_signature, normalize_sample};
pub use reason::{CacheDecisionReason, ScrapeDecision};
pub use smart_cache::SmartCache;
