use crate::error::CleaningError;
use chrono::{Datelike, NaiveDate};
use core_types::stats::compound;
use core_types::{DateTable, ValueTable};

/// Daily and monthly returns derived from one aligned close table.
#[derive(Debug, Clone, PartialEq)]
pub struct Returns {
    pub daily: ValueTable,
    pub monthly: ValueTable,
}

/// Derives simple daily returns and compounded calendar-month returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReturnEngine;

impl ReturnEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes both return tables from the aligned closes.
    pub fn calculate(&self, closes: &ValueTable) -> Result<Returns, CleaningError> {
        let daily = self.daily_returns(closes)?;
        let monthly = self.monthly_returns(&daily)?;
        Ok(Returns { daily, monthly })
    }

    /// Percentage change between consecutive aligned rows, per instrument.
    ///
    /// The previous row is the previous *available* trading date, not the
    /// previous calendar day. The first row has no prior value and is dropped.
    pub fn daily_returns(&self, closes: &ValueTable) -> Result<ValueTable, CleaningError> {
        if closes.len() < 2 {
            return Err(CleaningError::InsufficientHistory { rows: closes.len() });
        }

        let dates = closes.dates()[1..].to_vec();
        let columns = closes
            .columns()
            .map(|(_, prices)| prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect())
            .collect();

        let daily = DateTable::new(dates, closes.instruments().to_vec(), columns)?;
        tracing::info!(rows = daily.len(), "Computed daily returns.");
        Ok(daily)
    }

    /// Compounds daily returns within each calendar month: `prod(1 + r) - 1`.
    ///
    /// Rows are keyed by the calendar month-end date; months without trading
    /// days produce no row.
    pub fn monthly_returns(&self, daily: &ValueTable) -> Result<ValueTable, CleaningError> {
        let months = month_spans(daily.dates());

        let dates = months.iter().map(|span| span.month_end).collect();
        let columns = daily
            .columns()
            .map(|(_, returns)| {
                months
                    .iter()
                    .map(|span| compound(returns[span.start..span.end].iter().copied()))
                    .collect()
            })
            .collect();

        let monthly = DateTable::new(dates, daily.instruments().to_vec(), columns)?;
        tracing::debug!(months = monthly.len(), "Computed monthly returns.");
        Ok(monthly)
    }
}

/// Row range `[start, end)` of one calendar month within a date index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonthSpan {
    month_end: NaiveDate,
    start: usize,
    end: usize,
}

/// Splits an ascending date index into contiguous calendar-month spans.
fn month_spans(dates: &[NaiveDate]) -> Vec<MonthSpan> {
    let mut spans: Vec<MonthSpan> = Vec::new();
    for (i, date) in dates.iter().enumerate() {
        let month_end = last_day_of_month(*date);
        match spans.last_mut() {
            Some(span) if span.month_end == month_end => span.end = i + 1,
            _ => spans.push(MonthSpan {
                month_end,
                start: i,
                end: i + 1,
            }),
        }
    }
    spans
}

pub(crate) fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}
