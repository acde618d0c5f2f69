use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleaningError {
    /// No usable common history across instruments. Retrying with the same
    /// input cannot succeed.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Invalid close price {price} for {instrument} on {date}")]
    InvalidPrice {
        instrument: String,
        date: String,
        price: String,
    },

    #[error("Insufficient history: {rows} aligned row(s), at least 2 are required to compute returns")]
    InsufficientHistory { rows: usize },

    #[error("Table construction error: {0}")]
    Table(#[from] CoreError),
}
