use crate::PriceFeed;
use crate::error::FeedError;
use crate::rows::RawQuoteRow;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Instrument, PriceBar};
use std::path::{Path, PathBuf};

/// A feed backed by a directory of provider exports, one `<INSTRUMENT>.csv` per
/// instrument with the header `Date,Open,High,Low,Close,Adj Close,Volume`.
#[derive(Debug, Clone)]
pub struct CsvPriceFeed {
    data_dir: PathBuf,
}

impl CsvPriceFeed {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The file a given instrument is read from.
    pub fn path_for(&self, instrument: &Instrument) -> PathBuf {
        self.data_dir.join(format!("{}.csv", instrument.as_str()))
    }
}

#[async_trait]
impl PriceFeed for CsvPriceFeed {
    async fn fetch_bars(
        &self,
        instrument: &Instrument,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, FeedError> {
        let path = self.path_for(instrument);
        let contents = tokio::fs::read(&path).await?;
        tracing::debug!(%instrument, path = %path.display(), bytes = contents.len(), "Read provider export.");

        parse_export(&contents, start, end)
    }
}

/// Parses a provider export, keeping only bars dated within `[start, end)`.
pub fn parse_export(contents: &[u8], start: NaiveDate, end: NaiveDate) -> Result<Vec<PriceBar>, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(contents);

    let mut bars = Vec::new();
    for (line, row) in reader.deserialize::<RawQuoteRow>().enumerate() {
        let bar = row?.into_bar().map_err(|e| match e {
            // +2: one for the header, one for 1-based numbering.
            FeedError::InvalidData(msg) => FeedError::InvalidData(format!("line {}: {msg}", line + 2)),
            other => other,
        })?;
        if bar.date >= start && bar.date < end {
            bars.push(bar);
        }
    }
    Ok(bars)
}
