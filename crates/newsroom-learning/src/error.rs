use thiserror::Error;

#[derive(Error, Debug)]
pub enum LearningError {
    #[error("repository error during learning cycle: {0}")]
    Repository(String),
}
