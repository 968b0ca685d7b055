pub mod cancel;
pub mod capability;
pub mod deps;
pub mod error;
pub mod repo;

pub use cancel::{CancelReason, CancellationToken};
pub use capability::{Embedder, LlmClient, LlmResponse, LlmResponseSource, Scraper, EMBEDDING_DIM};
pub use deps::PipelineDeps;
pub use error::CapabilityError;
