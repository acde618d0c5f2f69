use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnomalyError {
    #[error("Invalid anomaly detector parameters: {0}")]
    InvalidParameters(String),
}
