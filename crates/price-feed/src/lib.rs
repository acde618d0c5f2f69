//! # Source Feed
//!
//! Supplies the raw, multi-field price history for a basket of instruments.
//! The analytics core never talks to a provider directly; it receives the
//! [`RawPriceTable`] this crate assembles.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Instrument, PriceBar, RawPriceTable};
use futures::future::join_all;

pub mod csv_feed;
pub mod error;
mod rows;

// --- Public API ---
pub use csv_feed::CsvPriceFeed;
pub use error::FeedError;

/// The abstract interface for a daily market-data source.
///
/// Implementations return the bars observed for one instrument, dated in
/// `[start, end)`, in any order.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_bars(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FeedError>;
}

/// Fetches every instrument concurrently and merges the results into one table.
///
/// A failed instrument does not abort the basket: the failure is logged and the
/// instrument is registered with no observations, leaving it to the aligner to
/// decide whether any common history remains.
pub async fn fetch_basket(
    feed: &dyn PriceFeed,
    instruments: &[Instrument],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RawPriceTable, FeedError> {
    if start >= end {
        return Err(FeedError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let fetches = instruments
        .iter()
        .map(|instrument| feed.fetch_bars(instrument, start, end));
    let results = join_all(fetches).await;

    let mut table = RawPriceTable::new();
    for (instrument, result) in instruments.iter().zip(results) {
        table.register(instrument.clone());
        match result {
            Ok(bars) => {
                tracing::info!(%instrument, bars = bars.len(), "Fetched price history.");
                for bar in bars {
                    table.insert(instrument.clone(), bar);
                }
            }
            Err(e) => {
                tracing::warn!(%instrument, error = %e, "Failed to fetch price history; instrument left empty.");
            }
        }
    }

    tracing::info!(
        instruments = table.instrument_count(),
        bars = table.bar_count(),
        "Price history assembled."
    );
    Ok(table)
}
