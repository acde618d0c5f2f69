use crate::error::CleaningError;
use core_types::{DateTable, Instrument, PriceField, RawPriceTable, ValueTable};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Builds the gap-free closing-price table from raw provider data.
///
/// A date survives only if *every* instrument has a usable close on it. There
/// is no forward or backward fill, so one instrument's gap removes that date
/// for the whole basket.
#[derive(Debug, Default, Clone, Copy)]
pub struct Aligner;

impl Aligner {
    pub fn new() -> Self {
        Self
    }

    /// Selects the close of each instrument and keeps the intersection of dates.
    ///
    /// # Errors
    ///
    /// * `DataIntegrity` if the raw table holds no observations or no date is
    ///   shared by all instruments.
    /// * `InvalidPrice` if a surviving close is zero or negative.
    #[tracing::instrument(name = "align_closes", skip_all, fields(instruments = raw.instrument_count()))]
    pub fn align(&self, raw: &RawPriceTable) -> Result<ValueTable, CleaningError> {
        if raw.is_empty() {
            return Err(CleaningError::DataIntegrity(
                "raw price table is empty; the feed returned no observations".to_string(),
            ));
        }

        let instruments: Vec<Instrument> = raw.instruments().cloned().collect();
        let candidates = raw.dates();

        let mut dates = Vec::with_capacity(candidates.len());
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(candidates.len()); instruments.len()];
        let mut missing = vec![0usize; instruments.len()];

        for date in &candidates {
            let row: Vec<Option<f64>> = instruments
                .iter()
                .map(|instrument| raw.value(instrument, PriceField::Close, *date).and_then(to_price))
                .collect();

            if row.iter().all(Option::is_some) {
                dates.push(*date);
                for (column, price) in columns.iter_mut().zip(row.into_iter().flatten()) {
                    column.push(price);
                }
            } else {
                for (count, price) in missing.iter_mut().zip(&row) {
                    if price.is_none() {
                        *count += 1;
                    }
                }
            }
        }

        for (instrument, count) in instruments.iter().zip(&missing) {
            if *count > 0 {
                tracing::debug!(%instrument, missing = count, "Instrument lacks a close on some candidate dates.");
            }
        }

        if dates.is_empty() {
            return Err(CleaningError::DataIntegrity(format!(
                "no common trading dates across {} instruments ({} candidate dates)",
                instruments.len(),
                candidates.len()
            )));
        }

        for (instrument, column) in instruments.iter().zip(&columns) {
            if let Some((i, price)) = column.iter().enumerate().find(|(_, p)| **p <= 0.0) {
                return Err(CleaningError::InvalidPrice {
                    instrument: instrument.to_string(),
                    date: dates[i].to_string(),
                    price: price.to_string(),
                });
            }
        }

        tracing::info!(
            rows = dates.len(),
            dropped = candidates.len() - dates.len(),
            "Aligned closing prices."
        );

        Ok(DateTable::new(dates, instruments, columns)?)
    }
}

/// Converts a provider close into `f64`; anything not finite counts as missing.
fn to_price(close: Decimal) -> Option<f64> {
    close.to_f64().filter(|p| p.is_finite())
}
