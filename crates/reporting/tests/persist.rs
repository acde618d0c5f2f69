use chrono::{Duration, NaiveDate};
use configuration::{AnalysisSettings, Paths};
use core_types::{Instrument, PriceBar, RawPriceTable};
use pipeline::Pipeline;
use reporting::persist_all;
use rust_decimal_macros::dec;

fn raw_basket() -> RawPriceTable {
    let start = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();
    let mut raw = RawPriceTable::new();
    for symbol in ["SPY", "QQQ"] {
        let instrument = Instrument::new(symbol).unwrap();
        for i in 0..10 {
            let close = dec!(100) + rust_decimal::Decimal::from(i * (i % 3));
            raw.insert(
                instrument.clone(),
                PriceBar {
                    close: Some(close),
                    ..PriceBar::empty(start + Duration::days(i))
                },
            );
        }
    }
    raw
}

#[test]
fn every_output_lands_in_its_directory() {
    let root = tempfile::tempdir().unwrap();
    let paths = Paths {
        raw: root.path().join("data/raw"),
        clean: root.path().join("data/clean"),
        reports: root.path().join("reports"),
        logs: None,
    };
    let raw = raw_basket();
    let output = Pipeline::new(&AnalysisSettings::default())
        .unwrap()
        .run(&raw, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        .unwrap();

    let written = persist_all(&paths, &raw, &output).unwrap();

    for file in [
        paths.raw.join("etf_raw.csv"),
        paths.clean.join("etf_clean_close.csv"),
        paths.clean.join("etf_daily_returns.csv"),
        paths.clean.join("etf_monthly_returns.csv"),
        paths.reports.join("kpi_summary.csv"),
        paths.reports.join("rolling_volatility.csv"),
        paths.reports.join("anomaly_summary.csv"),
        paths.reports.join("monthly_heatmap_SPY.csv"),
        paths.reports.join("monthly_heatmap_QQQ.csv"),
    ] {
        assert!(file.exists(), "missing {}", file.display());
        assert!(written.contains(&file));
    }

    let closes = std::fs::read_to_string(paths.clean.join("etf_clean_close.csv")).unwrap();
    let mut lines = closes.lines();
    // Columns follow identifier order.
    assert_eq!(lines.next(), Some("Date,QQQ,SPY"));
    assert_eq!(lines.count(), 10);

    let summary = std::fs::read_to_string(paths.reports.join("anomaly_summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
}
