use crate::error::ReportError;
use crate::heatmap::MonthlyHeatmap;
use analytics::KpiSummary;
use anomaly::{AnomalyRecord, AnomalySummaryRow, FlaggedReturn};
use configuration::Paths;
use core_types::{DateTable, PriceField, RawPriceTable};
use csv::Writer;
use pipeline::PipelineOutput;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A value that can be written as one CSV cell. Undefined values are empty.
pub trait CsvCell {
    fn to_cell(&self) -> String;
}

impl CsvCell for f64 {
    fn to_cell(&self) -> String {
        self.to_string()
    }
}

impl<T: CsvCell> CsvCell for Option<T> {
    fn to_cell(&self) -> String {
        self.as_ref().map(CsvCell::to_cell).unwrap_or_default()
    }
}

/// Writes a date-indexed table: a `Date` column followed by one column per instrument.
pub fn write_date_table<T: CsvCell, W: io::Write>(table: &DateTable<T>, writer: W) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["Date".to_string()];
    header.extend(table.instruments().iter().map(ToString::to_string));
    wtr.write_record(&header)?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(table.row(row).map(CsvCell::to_cell));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the raw table in long format, one line per (date, instrument).
pub fn write_raw_table<W: io::Write>(raw: &RawPriceTable, writer: W) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["Date", "Instrument"];
    header.extend(PriceField::ALL.iter().map(PriceField::header));
    wtr.write_record(&header)?;

    for instrument in raw.instruments() {
        for bar in raw.bars(instrument) {
            let mut record = vec![bar.date.to_string(), instrument.to_string()];
            record.extend(
                PriceField::ALL
                    .iter()
                    .map(|field| bar.field(*field).map(|v| v.to_string()).unwrap_or_default()),
            );
            wtr.write_record(&record)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_kpi_summary<W: io::Write>(summary: &KpiSummary, writer: W) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "Instrument",
        "Annualized Volatility",
        "Maximum Drawdown",
        "YTD Return",
        "YTD Observations",
        "Total Return",
    ])?;
    for row in &summary.rows {
        wtr.write_record([
            row.instrument.to_string(),
            row.annualized_volatility.to_cell(),
            row.max_drawdown.to_cell(),
            row.ytd_return.to_cell(),
            row.ytd_observations.to_string(),
            row.total_return.to_cell(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_anomaly_records<W: io::Write>(records: &[AnomalyRecord], writer: W) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Date", "Instrument", "Daily Return", "Z-Score"])?;
    for record in records {
        wtr.write_record([
            record.date.to_string(),
            record.instrument.to_string(),
            record.daily_return.to_cell(),
            record.score.to_cell(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_anomaly_summary<W: io::Write>(summary: &[AnomalySummaryRow], writer: W) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "Instrument",
        "Anomaly Count",
        "Worst Return",
        "Worst Date",
        "Largest Return",
        "Largest Date",
    ])?;

    let date = |event: Option<FlaggedReturn>| event.map(|e| e.date.to_string()).unwrap_or_default();
    let value = |event: Option<FlaggedReturn>| event.map(|e| e.daily_return).to_cell();
    for row in summary {
        wtr.write_record([
            row.instrument.to_string(),
            row.count.to_string(),
            value(row.worst),
            date(row.worst),
            value(row.largest),
            date(row.largest),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a heatmap as a `Year` column followed by the months 1 to 12.
pub fn write_heatmap<W: io::Write>(heatmap: &MonthlyHeatmap, writer: W) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec!["Year".to_string()];
    header.extend((1..=12).map(|month: u32| month.to_string()));
    wtr.write_record(&header)?;

    for (year, cells) in &heatmap.rows {
        let mut record = vec![year.to_string()];
        record.extend(cells.iter().map(CsvCell::to_cell));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes every output of a run under the configured directories, creating
/// them as needed. Returns the files written.
#[tracing::instrument(name = "persist_outputs", skip_all, fields(reports = %paths.reports.display()))]
pub fn persist_all(
    paths: &Paths,
    raw: &RawPriceTable,
    output: &PipelineOutput,
) -> Result<Vec<PathBuf>, ReportError> {
    for dir in [&paths.raw, &paths.clean, &paths.reports] {
        fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }

    let mut out = OutputFiles::default();
    out.save(&paths.raw, "etf_raw.csv", |f| write_raw_table(raw, f))?;

    out.save(&paths.clean, "etf_clean_close.csv", |f| write_date_table(&output.closes, f))?;
    out.save(&paths.clean, "etf_daily_returns.csv", |f| write_date_table(&output.daily_returns, f))?;
    out.save(&paths.clean, "etf_monthly_returns.csv", |f| write_date_table(&output.monthly_returns, f))?;

    let kpis = &output.kpis;
    out.save(&paths.reports, "kpi_summary.csv", |f| write_kpi_summary(&kpis.summary, f))?;
    out.save(&paths.reports, "cumulative_returns.csv", |f| write_date_table(&kpis.cumulative_returns, f))?;
    out.save(&paths.reports, "drawdown_curves.csv", |f| write_date_table(&kpis.drawdowns, f))?;
    out.save(&paths.reports, "rolling_volatility.csv", |f| write_date_table(&kpis.rolling_volatility, f))?;

    let anomalies = &output.anomalies;
    out.save(&paths.reports, "anomalies.csv", |f| write_anomaly_records(&anomalies.records, f))?;
    out.save(&paths.reports, "anomaly_summary.csv", |f| write_anomaly_summary(&anomalies.summary, f))?;

    for heatmap in MonthlyHeatmap::for_each_instrument(&output.monthly_returns) {
        let name = format!("monthly_heatmap_{}.csv", heatmap.instrument);
        out.save(&paths.reports, &name, |f| write_heatmap(&heatmap, f))?;
    }

    tracing::info!(files = out.written.len(), "All outputs saved.");
    Ok(out.written)
}

#[derive(Default)]
struct OutputFiles {
    written: Vec<PathBuf>,
}

impl OutputFiles {
    fn save(
        &mut self,
        dir: &Path,
        name: &str,
        write: impl FnOnce(fs::File) -> Result<(), ReportError>,
    ) -> Result<(), ReportError> {
        let path = dir.join(name);
        write(fs::File::create(&path)?)?;
        tracing::debug!(path = %path.display(), "Saved output file.");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Instrument, PriceBar};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> Result<(), ReportError>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn sparse_cells_are_written_empty() {
        let table = DateTable::new(
            vec![date(2024, 1, 2), date(2024, 1, 3)],
            vec![Instrument::new("SPY").unwrap(), Instrument::new("QQQ").unwrap()],
            vec![vec![None, Some(0.5)], vec![Some(0.25), None]],
        )
        .unwrap();

        let csv = render(|buf| write_date_table(&table, buf));
        assert_eq!(csv, "Date,SPY,QQQ\n2024-01-02,,0.25\n2024-01-03,0.5,\n");
    }

    #[test]
    fn raw_table_is_written_in_long_format() {
        let spy = Instrument::new("SPY").unwrap();
        let mut raw = RawPriceTable::new();
        raw.insert(
            spy.clone(),
            PriceBar {
                close: Some(dec!(470.5)),
                volume: Some(1200),
                ..PriceBar::empty(date(2024, 1, 2))
            },
        );
        raw.register(Instrument::new("EFA").unwrap());

        let csv = render(|buf| write_raw_table(&raw, buf));
        assert_eq!(
            csv,
            "Date,Instrument,Open,High,Low,Close,Adj Close,Volume\n2024-01-02,SPY,,,,470.5,,1200\n"
        );
    }

    #[test]
    fn anomaly_summary_leaves_missing_events_empty() {
        let summary = vec![
            AnomalySummaryRow {
                instrument: Instrument::new("SPY").unwrap(),
                count: 0,
                worst: None,
                largest: None,
            },
            AnomalySummaryRow {
                instrument: Instrument::new("QQQ").unwrap(),
                count: 1,
                worst: Some(FlaggedReturn {
                    date: date(2024, 3, 1),
                    daily_return: -0.05,
                }),
                largest: Some(FlaggedReturn {
                    date: date(2024, 3, 1),
                    daily_return: -0.05,
                }),
            },
        ];

        let csv = render(|buf| write_anomaly_summary(&summary, buf));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "SPY,0,,,,");
        assert_eq!(lines[2], "QQQ,1,-0.05,2024-03-01,-0.05,2024-03-01");
    }

    #[test]
    fn heatmap_has_twelve_month_columns() {
        let spy = Instrument::new("SPY").unwrap();
        let monthly = DateTable::new(vec![date(2024, 2, 29)], vec![spy.clone()], vec![vec![0.03]]).unwrap();
        let heatmap = MonthlyHeatmap::from_monthly(&monthly, &spy).unwrap();

        let csv = render(|buf| write_heatmap(&heatmap, buf));
        assert_eq!(csv, "Year,1,2,3,4,5,6,7,8,9,10,11,12\n2024,,0.03,,,,,,,,,,\n");
    }
}
