use chrono::{Duration, NaiveDate};
use cleaning::CleaningError;
use configuration::AnalysisSettings;
use core_types::{Instrument, PriceBar, RawPriceTable};
use pipeline::{Pipeline, PipelineError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64)
}

fn bar(date: NaiveDate, close: Decimal) -> PriceBar {
    PriceBar {
        close: Some(close),
        adjusted_close: Some(close),
        ..PriceBar::empty(date)
    }
}

/// A rises 1% every day; B is flat apart from a single 15% fall on day 20.
fn two_instrument_basket() -> RawPriceTable {
    let a = Instrument::new("A").unwrap();
    let b = Instrument::new("B").unwrap();
    let mut raw = RawPriceTable::new();

    let mut price_a = 100.0f64;
    for i in 0..40 {
        raw.insert(a.clone(), bar(day(i), Decimal::from_f64_retain(price_a).unwrap()));
        price_a *= 1.01;

        let price_b = if i < 20 { dec!(100) } else { dec!(85) };
        raw.insert(b.clone(), bar(day(i), price_b));
    }
    raw
}

fn pipeline() -> Pipeline {
    Pipeline::new(&AnalysisSettings::default()).unwrap()
}

#[test]
fn single_crash_is_the_only_anomaly_and_sets_the_drawdown() {
    let raw = two_instrument_basket();
    let output = pipeline().run(&raw, day(100)).unwrap();

    assert_eq!(output.closes.len(), 40);
    assert_eq!(output.daily_returns.len(), 39);

    let a = Instrument::new("A").unwrap();
    let b = Instrument::new("B").unwrap();

    let kpi_b = output.kpis.summary.get(&b).unwrap();
    assert!((kpi_b.max_drawdown - (-0.15)).abs() < 1e-9);
    let kpi_a = output.kpis.summary.get(&a).unwrap();
    assert_eq!(kpi_a.max_drawdown, 0.0);

    let records = &output.anomalies.records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].instrument, b);
    assert_eq!(records[0].date, day(20));
    assert!((records[0].daily_return - (-0.15)).abs() < 1e-9);

    assert_eq!(output.anomalies.records_for(&b).count(), 1);
    assert_eq!(output.anomalies.records_for(&a).count(), 0);
    assert_eq!(output.anomalies.summary_for(&b).map(|s| s.count), Some(1));
    assert_eq!(output.anomalies.summary_for(&a).map(|s| s.count), Some(0));
    assert_eq!(output.anomalies.summary.len(), 2);
}

#[test]
fn year_to_date_follows_the_run_date() {
    let raw = two_instrument_basket();
    let b = Instrument::new("B").unwrap();

    let this_year = pipeline().run(&raw, day(100)).unwrap();
    let row = this_year.kpis.summary.get(&b).unwrap();
    assert_eq!(row.ytd_observations, 39);
    assert!((row.ytd_return - (-0.15)).abs() < 1e-9);

    let next_year = pipeline().run(&raw, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()).unwrap();
    let row = next_year.kpis.summary.get(&b).unwrap();
    assert_eq!(row.ytd_observations, 0);
    assert_eq!(row.ytd_return, 0.0);
}

#[test]
fn monthly_rows_follow_the_calendar_months_of_the_daily_index() {
    let output = pipeline().run(&two_instrument_basket(), day(100)).unwrap();
    // Daily index runs from 2 January to 9 February.
    assert_eq!(
        output.monthly_returns.dates(),
        &[
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        ]
    );
}

#[test]
fn rolling_volatility_starts_once_the_window_is_full() {
    let output = pipeline().run(&two_instrument_basket(), day(100)).unwrap();
    let rolling = output.kpis.rolling_volatility.column(1).unwrap();
    assert!(rolling[..29].iter().all(Option::is_none));
    assert!(rolling[29..].iter().all(Option::is_some));
}

#[test]
fn gaps_drop_the_date_for_the_whole_basket() {
    let mut raw = two_instrument_basket();
    let c = Instrument::new("C").unwrap();
    for i in (0..40).filter(|i| i % 4 != 0) {
        raw.insert(c.clone(), bar(day(i), dec!(50)));
    }

    let output = pipeline().run(&raw, day(100)).unwrap();
    assert_eq!(output.closes.len(), 30);
    assert!(output.closes.dates().iter().all(|d| (*d - day(0)).num_days() % 4 != 0));
}

#[test]
fn empty_feed_result_is_a_data_integrity_error() {
    let mut raw = RawPriceTable::new();
    raw.register(Instrument::new("A").unwrap());

    let err = pipeline().run(&raw, day(100)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Cleaning(CleaningError::DataIntegrity(_))
    ));
}

#[test]
fn a_single_common_row_is_insufficient_history() {
    let mut raw = RawPriceTable::new();
    raw.insert(Instrument::new("A").unwrap(), bar(day(0), dec!(10)));

    let err = pipeline().run(&raw, day(100)).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Cleaning(CleaningError::InsufficientHistory { rows: 1 })
    ));
}

#[test]
fn unusable_settings_are_rejected_up_front() {
    let settings = AnalysisSettings {
        rolling_window: 1,
        ..AnalysisSettings::default()
    };
    assert!(matches!(Pipeline::new(&settings), Err(PipelineError::Analytics(_))));

    let settings = AnalysisSettings {
        anomaly_threshold: -1.0,
        ..AnalysisSettings::default()
    };
    assert!(matches!(Pipeline::new(&settings), Err(PipelineError::Anomaly(_))));
}
