use core_types::{Instrument, SparseTable, ValueTable};
use serde::Serialize;

/// Risk and performance figures for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRow {
    pub instrument: Instrument,
    /// Sample standard deviation of daily returns scaled by `sqrt(trading days)`.
    /// `None` with fewer than two daily returns.
    pub annualized_volatility: Option<f64>,
    /// Deepest fall of the wealth curve from its running peak. Always `<= 0`.
    pub max_drawdown: f64,
    /// Compounded return of the rows in the current calendar year.
    pub ytd_return: f64,
    /// Rows that contributed to `ytd_return`. Zero means "no YTD data yet",
    /// not a flat year.
    pub ytd_observations: usize,
    /// Last aligned close over first aligned close, minus one.
    pub total_return: f64,
}

/// One row per instrument, in the column order of the input tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct KpiSummary {
    pub rows: Vec<KpiRow>,
}

impl KpiSummary {
    pub fn get(&self, instrument: &Instrument) -> Option<&KpiRow> {
        self.rows.iter().find(|row| &row.instrument == instrument)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the KPI engine produces for one run.
///
/// The series tables share the daily-return index.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    pub summary: KpiSummary,
    /// `prod(1 + r) - 1` up to and including each row.
    pub cumulative_returns: ValueTable,
    /// `(W - peak) / peak` of the wealth curve at each row.
    pub drawdowns: ValueTable,
    /// Annualized trailing-window volatility; `None` until the window fills.
    pub rolling_volatility: SparseTable,
}
