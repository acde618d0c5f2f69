//! # KPI Engine
//!
//! This crate derives the risk and performance indicators of each instrument
//! in the basket from its aligned closes and daily returns.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O and no knowledge of where the tables came from.
//!   It depends only on `core-types`.
//! - **Stateless calculation:** `KpiEngine` holds only its parameters. The run
//!   date is passed in explicitly, so the year-to-date window is reproducible
//!   in tests.
//! - **Per-instrument independence:** every metric reads a single column.
//!
//! ## Public API
//!
//! - `KpiEngine` / `KpiParams`: the calculator and its parameters.
//! - `KpiReport`: the summary plus cumulative, drawdown and rolling-volatility series.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{KpiEngine, KpiParams, cumulative_returns, drawdown_curve, max_drawdown};
pub use error::AnalyticsError;
pub use report::{KpiReport, KpiRow, KpiSummary};
