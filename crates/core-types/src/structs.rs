use crate::enums::PriceField;
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A ticker-like identifier for one exchange-traded security (e.g., "SPY").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// Creates an instrument id, trimming whitespace and upper-casing the symbol.
    pub fn new(symbol: impl AsRef<str>) -> Result<Self, CoreError> {
        let symbol = symbol.as_ref().trim();
        if symbol.is_empty() {
            return Err(CoreError::InvalidInput(
                "instrument".to_string(),
                "symbol must not be empty".to_string(),
            ));
        }
        if symbol.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
            return Err(CoreError::InvalidInput(
                "instrument".to_string(),
                format!("'{symbol}' contains whitespace or path separators"),
            ));
        }
        Ok(Self(symbol.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One trading day of provider data for a single instrument.
///
/// Every field is optional: providers leave holes for holidays, late listings
/// and outright gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub adjusted_close: Option<Decimal>,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// A bar for `date` with no observed fields.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            adjusted_close: None,
            volume: None,
        }
    }

    pub fn field(&self, field: PriceField) -> Option<Decimal> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::AdjustedClose => self.adjusted_close,
            PriceField::Volume => self.volume.map(Decimal::from),
        }
    }
}

/// Multi-instrument, multi-field daily price history as delivered by a feed.
///
/// Instruments iterate in identifier order, and each instrument's bars iterate
/// in date order. A registered instrument may have no bars at all, which is how
/// a failed fetch is represented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPriceTable {
    series: BTreeMap<Instrument, BTreeMap<NaiveDate, PriceBar>>,
}

impl RawPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an instrument without adding any observations.
    pub fn register(&mut self, instrument: Instrument) {
        self.series.entry(instrument).or_default();
    }

    /// Adds or replaces the bar for `bar.date`. The last write for a date wins.
    pub fn insert(&mut self, instrument: Instrument, bar: PriceBar) {
        self.series.entry(instrument).or_default().insert(bar.date, bar);
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.series.keys()
    }

    pub fn instrument_count(&self) -> usize {
        self.series.len()
    }

    pub fn bars(&self, instrument: &Instrument) -> impl Iterator<Item = &PriceBar> {
        self.series.get(instrument).into_iter().flat_map(|bars| bars.values())
    }

    pub fn bar(&self, instrument: &Instrument, date: NaiveDate) -> Option<&PriceBar> {
        self.series.get(instrument).and_then(|bars| bars.get(&date))
    }

    /// Looks up one (instrument, field) cell.
    pub fn value(&self, instrument: &Instrument, field: PriceField, date: NaiveDate) -> Option<Decimal> {
        self.bar(instrument, date).and_then(|bar| bar.field(field))
    }

    /// The union of all dates observed for any instrument, ascending.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.series
            .values()
            .flat_map(|bars| bars.keys().copied())
            .collect()
    }

    /// `true` when there are no instruments or not a single observed bar.
    pub fn is_empty(&self) -> bool {
        self.series.values().all(|bars| bars.is_empty())
    }

    /// Total number of (instrument, date) bars held.
    pub fn bar_count(&self) -> usize {
        self.series.values().map(|bars| bars.len()).sum()
    }
}
