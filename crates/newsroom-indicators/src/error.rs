use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("indicator {0} has no historical values to analyze")]
    NoHistory(String),
}
