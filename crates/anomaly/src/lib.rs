//! # Anomaly Engine
//!
//! Flags statistically unusual daily returns per instrument and summarizes the
//! worst and best flagged events.
//!
//! The scoring method sits behind [`OutlierMethod`]; [`ZScore`] is the one
//! shipped. The threshold is an explicit parameter of [`AnomalyDetector`].

use std::fmt::Debug;

pub mod detector;
pub mod error;
pub mod report;
pub mod zscore;

pub use detector::AnomalyDetector;
pub use error::AnomalyError;
pub use report::{AnomalyRecord, AnomalyReport, AnomalySummaryRow, FlaggedReturn};
pub use zscore::ZScore;

/// A statistical method that scores every value of one instrument's series.
pub trait OutlierMethod: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns one score per input value, `None` where the value cannot be
    /// scored. A value is flagged when `|score|` exceeds the threshold.
    fn scores(&self, values: &[f64]) -> Vec<Option<f64>>;
}
