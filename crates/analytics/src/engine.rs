use crate::error::AnalyticsError;
use crate::report::{KpiReport, KpiRow, KpiSummary};
use chrono::{Datelike, NaiveDate};
use core_types::stats::{self, Deviation};
use core_types::{Instrument, ValueTable};

/// Parameters of the KPI calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiParams {
    /// Trading days used to annualize daily volatility (252 by convention).
    pub trading_days_per_year: u32,
    /// Length of the trailing rolling-volatility window, in rows.
    pub rolling_window: usize,
}

impl Default for KpiParams {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            rolling_window: 30,
        }
    }
}

/// A stateless calculator for per-instrument risk and performance metrics.
///
/// Every metric is computed from one instrument's column only; there is no
/// cross-instrument computation.
#[derive(Debug, Clone)]
pub struct KpiEngine {
    params: KpiParams,
}

impl KpiEngine {
    /// Creates an engine, validating that the parameters are usable.
    pub fn new(params: KpiParams) -> Result<Self, AnalyticsError> {
        if params.rolling_window < 2 {
            return Err(AnalyticsError::InvalidParameters(format!(
                "rolling window must span at least 2 returns, got {}",
                params.rolling_window
            )));
        }
        if params.trading_days_per_year == 0 {
            return Err(AnalyticsError::InvalidParameters(
                "trading days per year must be greater than 0".to_string(),
            ));
        }
        Ok(Self { params })
    }

    /// The main entry point for calculating KPIs.
    ///
    /// # Arguments
    ///
    /// * `closes` - The aligned closing-price table.
    /// * `returns` - The daily returns derived from `closes`.
    /// * `today` - The run date; its calendar year bounds the YTD window.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `KpiReport` or an `AnalyticsError`.
    #[tracing::instrument(name = "calculate_kpis", skip_all, fields(instruments = returns.instruments().len(), rows = returns.len()))]
    pub fn calculate(
        &self,
        closes: &ValueTable,
        returns: &ValueTable,
        today: NaiveDate,
    ) -> Result<KpiReport, AnalyticsError> {
        self.validate_inputs(closes, returns)?;

        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or_else(|| {
            AnalyticsError::InvalidParameters(format!("cannot resolve the calendar year of {today}"))
        })?;

        let rows = closes
            .columns()
            .zip(returns.columns())
            .map(|((instrument, prices), (_, daily))| {
                self.summarize(instrument, prices, daily, returns.dates(), year_start)
            })
            .collect();

        let report = KpiReport {
            summary: KpiSummary { rows },
            cumulative_returns: returns.map_columns(|_, daily| cumulative_returns(daily)),
            drawdowns: returns.map_columns(|_, daily| drawdown_curve(daily)),
            rolling_volatility: returns.map_columns(|_, daily| self.rolling_volatility(daily)),
        };

        tracing::info!(year = today.year(), "KPIs calculated successfully.");
        Ok(report)
    }

    /// Checks that `returns` was derived from `closes`: same instruments in the
    /// same order, and a date index equal to the closes' minus the first row.
    fn validate_inputs(&self, closes: &ValueTable, returns: &ValueTable) -> Result<(), AnalyticsError> {
        if returns.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "the daily returns table has no rows".to_string(),
            ));
        }
        if !closes.same_instruments(returns) {
            return Err(AnalyticsError::Misaligned(
                "close and return tables have different instrument columns".to_string(),
            ));
        }
        if closes.dates().get(1..) != Some(returns.dates()) {
            return Err(AnalyticsError::Misaligned(format!(
                "{} close rows do not match {} return rows",
                closes.len(),
                returns.len()
            )));
        }
        Ok(())
    }

    fn summarize(
        &self,
        instrument: &Instrument,
        prices: &[f64],
        daily: &[f64],
        dates: &[NaiveDate],
        year_start: NaiveDate,
    ) -> KpiRow {
        let annualized_volatility = stats::std_dev(daily, Deviation::Sample)
            .map(|std| stats::annualize(std, self.params.trading_days_per_year));

        let ytd: Vec<f64> = dates
            .iter()
            .zip(daily)
            .filter(|(date, _)| **date >= year_start)
            .map(|(_, r)| *r)
            .collect();
        if ytd.is_empty() {
            tracing::debug!(%instrument, %year_start, "No rows in the current year; YTD return is 0.");
        }

        let total_return = match (prices.first(), prices.last()) {
            (Some(first), Some(last)) => last / first - 1.0,
            _ => 0.0,
        };

        KpiRow {
            instrument: instrument.clone(),
            annualized_volatility,
            max_drawdown: max_drawdown(daily),
            ytd_return: stats::compound(ytd.iter().copied()),
            ytd_observations: ytd.len(),
            total_return,
        }
    }

    /// Annualized sample volatility of each trailing window ending at a row.
    ///
    /// The first `rolling_window - 1` rows are `None`.
    fn rolling_volatility(&self, daily: &[f64]) -> Vec<Option<f64>> {
        let window = self.params.rolling_window;
        (0..daily.len())
            .map(|i| {
                if i + 1 < window {
                    return None;
                }
                stats::std_dev(&daily[i + 1 - window..=i], Deviation::Sample)
                    .map(|std| stats::annualize(std, self.params.trading_days_per_year))
            })
            .collect()
    }
}

/// The wealth curve `W(t) = prod_{s<=t}(1 + r_s)`.
fn wealth_curve(daily: &[f64]) -> impl Iterator<Item = f64> + '_ {
    daily.iter().scan(1.0, |wealth, r| {
        *wealth *= 1.0 + r;
        Some(*wealth)
    })
}

/// Cumulative return at each row: `W(t) - 1`.
pub fn cumulative_returns(daily: &[f64]) -> Vec<f64> {
    wealth_curve(daily).map(|w| w - 1.0).collect()
}

/// Drawdown at each row, `(W(t) - P(t)) / P(t)` with `P` the running peak of `W`.
///
/// The peak starts at the first row's wealth, not at 1.0.
pub fn drawdown_curve(daily: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    wealth_curve(daily)
        .map(|wealth| {
            peak = peak.max(wealth);
            if peak > 0.0 { (wealth - peak) / peak } else { 0.0 }
        })
        .collect()
}

/// Minimum of the drawdown curve; `0.0` for a curve that never declines.
pub fn max_drawdown(daily: &[f64]) -> f64 {
    drawdown_curve(daily).into_iter().fold(0.0, f64::min)
}
