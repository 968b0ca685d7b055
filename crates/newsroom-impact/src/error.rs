use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("sector dependency graph contains a cycle through {0:?}")]
    CyclicSectorGraph(String),
}
