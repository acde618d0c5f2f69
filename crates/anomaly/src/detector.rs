use crate::OutlierMethod;
use crate::error::AnomalyError;
use crate::report::{AnomalyRecord, AnomalyReport, AnomalySummaryRow, FlaggedReturn};
use crate::zscore::ZScore;
use core_types::{Instrument, ValueTable};

/// Flags daily returns whose score magnitude exceeds a threshold and
/// summarizes the flagged events per instrument.
#[derive(Debug)]
pub struct AnomalyDetector {
    threshold: f64,
    method: Box<dyn OutlierMethod>,
}

impl AnomalyDetector {
    /// Creates a detector with an explicit scoring method.
    pub fn new(threshold: f64, method: Box<dyn OutlierMethod>) -> Result<Self, AnomalyError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AnomalyError::InvalidParameters(format!(
                "threshold must be a positive number, got {threshold}"
            )));
        }
        Ok(Self { threshold, method })
    }

    /// A detector using the z-score method.
    pub fn z_score(threshold: f64) -> Result<Self, AnomalyError> {
        Self::new(threshold, Box::new(ZScore))
    }

    /// Scores each instrument's returns independently and collects the flags.
    #[tracing::instrument(name = "detect_anomalies", skip_all, fields(method = self.method.name(), threshold = self.threshold))]
    pub fn detect(&self, returns: &ValueTable) -> AnomalyReport {
        let dates = returns.dates();

        // (row, column, record) so the final order is date first, column second.
        let mut flagged: Vec<(usize, usize, AnomalyRecord)> = returns
            .columns()
            .enumerate()
            .flat_map(|(column, (instrument, values))| {
                let scores = self.method.scores(values);
                if scores.iter().all(Option::is_none) && !values.is_empty() {
                    tracing::debug!(%instrument, "Series could not be scored; no anomalies flagged.");
                }
                scores
                    .into_iter()
                    .zip(values)
                    .enumerate()
                    .filter_map(|(row, (score, value))| {
                        let score = score.filter(|s| s.abs() > self.threshold)?;
                        Some((
                            row,
                            column,
                            AnomalyRecord {
                                date: dates[row],
                                instrument: instrument.clone(),
                                daily_return: *value,
                                score,
                            },
                        ))
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        flagged.sort_by_key(|(row, column, _)| (*row, *column));

        let records: Vec<AnomalyRecord> = flagged.into_iter().map(|(_, _, record)| record).collect();

        let summary = returns
            .instruments()
            .iter()
            .map(|instrument| summarize(instrument, &records))
            .collect();

        tracing::info!(total = records.len(), "Anomaly detection completed.");
        AnomalyReport { records, summary }
    }
}

/// Builds one instrument's summary row from the date-ordered records.
fn summarize(instrument: &Instrument, records: &[AnomalyRecord]) -> AnomalySummaryRow {
    let own: Vec<FlaggedReturn> = records
        .iter()
        .filter(|record| &record.instrument == instrument)
        .map(|record| FlaggedReturn {
            date: record.date,
            daily_return: record.daily_return,
        })
        .collect();

    // Strict comparisons keep the earliest event on ties.
    let worst = own.iter().copied().reduce(|best, next| {
        if next.daily_return < best.daily_return { next } else { best }
    });
    let largest = own.iter().copied().reduce(|best, next| {
        if next.daily_return > best.daily_return { next } else { best }
    });

    AnomalySummaryRow {
        instrument: instrument.clone(),
        count: own.len(),
        worst,
        largest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::DateTable;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(i as i64)).collect()
    }

    fn table(columns: Vec<Vec<f64>>) -> ValueTable {
        let n = columns[0].len();
        let ids = (0..columns.len())
            .map(|i| Instrument::new(format!("ETF{i}")).unwrap())
            .collect();
        DateTable::new(dates(n), ids, columns).unwrap()
    }

    /// A small alternating series with mean 0 and population deviation 0.01.
    fn quiet(n: usize) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { 0.01 } else { -0.01 }).collect()
    }

    #[test]
    fn injected_spike_is_flagged_and_is_the_largest_return() {
        let mut series = quiet(200);
        // mean + 10 * stddev of the quiet series.
        series[120] = 0.10;
        let returns = table(vec![series]);

        let report = AnomalyDetector::z_score(3.0).unwrap().detect(&returns);

        let spike_date = returns.dates()[120];
        assert!(report.records.iter().any(|r| r.date == spike_date));
        let summary = &report.summary[0];
        assert_eq!(summary.largest.map(|e| e.date), Some(spike_date));
        assert_eq!(summary.largest.map(|e| e.daily_return), Some(0.10));
    }

    #[test]
    fn summary_has_one_row_per_instrument() {
        let mut spiky = quiet(100);
        spiky[10] = -0.2;
        spiky[50] = 0.2;
        let returns = table(vec![quiet(100), spiky, vec![0.0; 100]]);

        let report = AnomalyDetector::z_score(3.0).unwrap().detect(&returns);

        assert_eq!(report.summary.len(), 3);
        assert_eq!(report.summary[0].count, 0);
        assert_eq!(report.summary[0].worst, None);
        assert_eq!(report.summary[0].largest, None);
        assert_eq!(report.summary[1].count, 2);
        assert_eq!(report.summary[1].worst.map(|e| e.daily_return), Some(-0.2));
        assert_eq!(report.summary[1].largest.map(|e| e.daily_return), Some(0.2));
        // Zero variance: no anomalies, no numeric fault.
        assert_eq!(report.summary[2].count, 0);
    }

    #[test]
    fn records_are_sorted_by_date_then_column() {
        let mut a = quiet(100);
        let mut b = quiet(100);
        a[70] = 0.3;
        b[20] = -0.3;
        b[70] = 0.3;
        let returns = table(vec![a, b]);

        let report = AnomalyDetector::z_score(3.0).unwrap().detect(&returns);

        let order: Vec<(NaiveDate, &str)> = report
            .records
            .iter()
            .map(|r| (r.date, r.instrument.as_str()))
            .collect();
        let d = returns.dates();
        assert_eq!(order, vec![(d[20], "ETF1"), (d[70], "ETF0"), (d[70], "ETF1")]);
    }

    #[test]
    fn ties_resolve_to_the_first_occurrence() {
        let mut series = quiet(200);
        series[30] = -0.25;
        series[150] = -0.25;
        let returns = table(vec![series]);

        let report = AnomalyDetector::z_score(3.0).unwrap().detect(&returns);

        let worst = report.summary[0].worst.unwrap();
        assert_eq!(worst.date, returns.dates()[30]);
        assert_eq!(report.summary[0].count, 2);
    }

    #[test]
    fn threshold_is_a_parameter() {
        let mut series = quiet(100);
        series[40] = 0.03;
        let returns = table(vec![series]);

        let strict = AnomalyDetector::z_score(3.0).unwrap().detect(&returns);
        let loose = AnomalyDetector::z_score(2.0).unwrap().detect(&returns);
        assert!(strict.records.is_empty());
        assert_eq!(loose.records.len(), 1);
    }

    #[test]
    fn steady_growth_is_never_flagged() {
        let prices: Vec<f64> = (0..=252).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let growth = prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
        let report = AnomalyDetector::z_score(3.0).unwrap().detect(&table(vec![growth]));
        assert!(report.records.is_empty());
        assert_eq!(report.summary[0].count, 0);
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        assert!(AnomalyDetector::z_score(0.0).is_err());
        assert!(AnomalyDetector::z_score(f64::NAN).is_err());
    }

    #[derive(Debug)]
    struct AlwaysFlag;

    impl OutlierMethod for AlwaysFlag {
        fn name(&self) -> &'static str {
            "always"
        }

        fn scores(&self, values: &[f64]) -> Vec<Option<f64>> {
            vec![Some(100.0); values.len()]
        }
    }

    #[test]
    fn method_is_pluggable() {
        let returns = table(vec![vec![0.01, 0.02, 0.03]]);
        let report = AnomalyDetector::new(3.0, Box::new(AlwaysFlag)).unwrap().detect(&returns);
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.summary[0].worst.map(|e| e.daily_return), Some(0.01));
        assert_eq!(report.summary[0].largest.map(|e| e.daily_return), Some(0.03));
    }
}
