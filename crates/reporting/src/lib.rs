//! # Reporting
//!
//! Persists every table of a run as CSV and renders the summaries for the
//! terminal.
//!
//! - [`persist_all`]: writes raw, clean and report files under the configured paths.
//! - [`MonthlyHeatmap`]: year × month pivot of an instrument's monthly returns.
//! - [`kpi_table`] / [`anomaly_table`]: `comfy-table` renderings of the summaries.

pub mod console;
pub mod error;
pub mod heatmap;
pub mod writer;

pub use console::{anomaly_table, kpi_table};
pub use error::ReportError;
pub use heatmap::MonthlyHeatmap;
pub use writer::persist_all;
