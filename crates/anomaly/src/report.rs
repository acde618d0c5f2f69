use chrono::NaiveDate;
use core_types::Instrument;
use serde::Serialize;

/// One flagged (date, instrument) daily return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRecord {
    pub date: NaiveDate,
    pub instrument: Instrument,
    pub daily_return: f64,
    /// The score that crossed the threshold.
    pub score: f64,
}

/// A single flagged return and when it happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlaggedReturn {
    pub date: NaiveDate,
    pub daily_return: f64,
}

/// Per-instrument digest of the flagged subset.
///
/// Instruments with no anomalies still get a row, with `count == 0` and no extrema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalySummaryRow {
    pub instrument: Instrument,
    pub count: usize,
    /// Most negative flagged return (first occurrence on ties).
    pub worst: Option<FlaggedReturn>,
    /// Most positive flagged return (first occurrence on ties).
    pub largest: Option<FlaggedReturn>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnomalyReport {
    /// Sorted by date, then by instrument column order.
    pub records: Vec<AnomalyRecord>,
    /// Exactly one row per instrument, in column order.
    pub summary: Vec<AnomalySummaryRow>,
}

impl AnomalyReport {
    pub fn summary_for(&self, instrument: &Instrument) -> Option<&AnomalySummaryRow> {
        self.summary.iter().find(|row| &row.instrument == instrument)
    }

    pub fn records_for<'a>(&'a self, instrument: &'a Instrument) -> impl Iterator<Item = &'a AnomalyRecord> + 'a {
        self.records.iter().filter(move |record| &record.instrument == instrument)
    }
}
