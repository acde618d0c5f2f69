use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to read price data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse the provider CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data format from provider: {0}")]
    InvalidData(String),

    #[error("Invalid date range: start {start} is not before end {end}")]
    InvalidRange { start: String, end: String },
}
