//! L5 presentation (spec §4 "L5 Presentation", §7 degrade-never-fail): a
//! thin read-only `axum` surface over the relational/KV stores the
//! pipeline writes to. Every handler returns `degraded: true` alongside
//! partial or empty results on a repository read failure rather than a
//! 5xx, per spec §7's "API surfaces return partial results ... rather
//! than 5xx" rule. No write endpoints exist here; L1-L4 own all mutation.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::ApiState;
