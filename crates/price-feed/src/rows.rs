use crate::error::FeedError;
use chrono::NaiveDate;
use core_types::PriceBar;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use std::str::FromStr;

/// Intermediate struct for deserializing one row of a provider CSV export.
///
/// Every cell is kept as text first: providers write `null`, `NaN` or leave the
/// cell empty for missing observations.
#[derive(Debug, Deserialize)]
pub(crate) struct RawQuoteRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open", default)]
    open: Option<String>,
    #[serde(rename = "High", default)]
    high: Option<String>,
    #[serde(rename = "Low", default)]
    low: Option<String>,
    #[serde(rename = "Close", default)]
    close: Option<String>,
    #[serde(rename = "Adj Close", default)]
    adj_close: Option<String>,
    #[serde(rename = "Volume", default)]
    volume: Option<String>,
}

impl RawQuoteRow {
    pub(crate) fn into_bar(self) -> Result<PriceBar, FeedError> {
        Ok(PriceBar {
            date: parse_date(&self.date)?,
            open: parse_price(self.open.as_deref())?,
            high: parse_price(self.high.as_deref())?,
            low: parse_price(self.low.as_deref())?,
            close: parse_price(self.close.as_deref())?,
            adjusted_close: parse_price(self.adj_close.as_deref())?,
            volume: parse_volume(self.volume.as_deref())?,
        })
    }
}

/// Accepts `YYYY-MM-DD`, ignoring any trailing time/offset some exports append.
fn parse_date(raw: &str) -> Result<NaiveDate, FeedError> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| FeedError::InvalidData(format!("Invalid date '{raw}': {e}")))
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("null") || cell.eq_ignore_ascii_case("nan")
}

fn parse_price(cell: Option<&str>) -> Result<Option<Decimal>, FeedError> {
    let Some(cell) = cell.map(str::trim).filter(|c| !is_missing(c)) else {
        return Ok(None);
    };
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .map(Some)
        .map_err(|e| FeedError::InvalidData(format!("Invalid price '{cell}': {e}")))
}

fn parse_volume(cell: Option<&str>) -> Result<Option<u64>, FeedError> {
    let Some(cell) = cell.map(str::trim).filter(|c| !is_missing(c)) else {
        return Ok(None);
    };
    if let Ok(volume) = cell.parse::<u64>() {
        return Ok(Some(volume));
    }
    // Some exports write volume as a float ("1234.0").
    Decimal::from_str(cell)
        .ok()
        .filter(|v| !v.is_sign_negative())
        .and_then(|v| v.trunc().to_u64())
        .map(Some)
        .ok_or_else(|| FeedError::InvalidData(format!("Invalid volume '{cell}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_markers_become_none() {
        assert_eq!(parse_price(Some("null")).unwrap(), None);
        assert_eq!(parse_price(Some(" NaN ")).unwrap(), None);
        assert_eq!(parse_price(Some("")).unwrap(), None);
        assert_eq!(parse_price(None).unwrap(), None);
    }

    #[test]
    fn prices_parse_exactly() {
        assert_eq!(parse_price(Some("472.65")).unwrap(), Some(dec!(472.65)));
        assert!(parse_price(Some("abc")).is_err());
    }

    #[test]
    fn dates_tolerate_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_date("2024-01-02").unwrap(), expected);
        assert_eq!(parse_date("2024-01-02 00:00:00-05:00").unwrap(), expected);
        assert!(parse_date("01/02/2024").is_err());
    }

    #[test]
    fn float_volume_is_truncated() {
        assert_eq!(parse_volume(Some("1200")).unwrap(), Some(1200));
        assert_eq!(parse_volume(Some("1200.0")).unwrap(), Some(1200));
        assert!(parse_volume(Some("-5")).is_err());
    }
}
