use analytics::AnalyticsError;
use anomaly::AnomalyError;
use cleaning::CleaningError;
use thiserror::Error;

/// Failures of any stage. The stage's own error is carried unmodified.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Cleaning stage failed: {0}")]
    Cleaning(#[from] CleaningError),

    #[error("KPI stage failed: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Anomaly stage failed: {0}")]
    Anomaly(#[from] AnomalyError),
}
