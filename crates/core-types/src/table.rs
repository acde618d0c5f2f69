use crate::error::CoreError;
use crate::structs::Instrument;
use chrono::NaiveDate;
use serde::Serialize;

/// A date-indexed table with one column per instrument.
///
/// Storage is column-major because every engine in the pipeline works on one
/// instrument at a time. Tables are validated on construction and expose no
/// mutating methods; a stage that needs a different table builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateTable<T> {
    dates: Vec<NaiveDate>,
    instruments: Vec<Instrument>,
    columns: Vec<Vec<T>>,
}

/// Closing prices or returns where every cell is defined.
pub type ValueTable = DateTable<f64>;

/// A table where some cells are undefined (e.g., an incomplete rolling window).
pub type SparseTable = DateTable<Option<f64>>;

impl<T> DateTable<T> {
    /// Builds a table, checking that dates are strictly ascending, instruments
    /// are unique, and each column matches the date index in length.
    pub fn new(
        dates: Vec<NaiveDate>,
        instruments: Vec<Instrument>,
        columns: Vec<Vec<T>>,
    ) -> Result<Self, CoreError> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CoreError::Shape(format!(
                "dates must be strictly ascending, found {} followed by {}",
                pair[0], pair[1]
            )));
        }
        if instruments.len() != columns.len() {
            return Err(CoreError::Shape(format!(
                "{} instruments but {} columns",
                instruments.len(),
                columns.len()
            )));
        }
        for (i, instrument) in instruments.iter().enumerate() {
            if instruments[..i].contains(instrument) {
                return Err(CoreError::Shape(format!("duplicate instrument {instrument}")));
            }
        }
        if let Some((instrument, column)) = instruments
            .iter()
            .zip(&columns)
            .find(|(_, column)| column.len() != dates.len())
        {
            return Err(CoreError::Shape(format!(
                "column {instrument} has {} values for {} dates",
                column.len(),
                dates.len()
            )));
        }

        Ok(Self {
            dates,
            instruments,
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, index: usize) -> Option<&[T]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn column_for(&self, instrument: &Instrument) -> Option<&[T]> {
        self.instruments
            .iter()
            .position(|i| i == instrument)
            .and_then(|index| self.column(index))
    }

    /// Iterates `(instrument, column)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&Instrument, &[T])> {
        self.instruments
            .iter()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        self.columns.get(column).and_then(|values| values.get(row))
    }

    /// Iterates the cells of one row in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &T> {
        self.columns.iter().filter_map(move |values| values.get(row))
    }

    /// Whether another table has the same instrument columns in the same order.
    pub fn same_instruments<U>(&self, other: &DateTable<U>) -> bool {
        self.instruments == other.instruments
    }

    /// Builds a same-shaped table by transforming each column independently.
    pub fn map_columns<U, F>(&self, mut f: F) -> DateTable<U>
    where
        F: FnMut(&Instrument, &[T]) -> Vec<U>,
    {
        let columns = self
            .columns()
            .map(|(instrument, values)| {
                let mapped = f(instrument, values);
                debug_assert_eq!(mapped.len(), values.len());
                mapped
            })
            .collect();
        DateTable {
            dates: self.dates.clone(),
            instruments: self.instruments.clone(),
            columns,
        }
    }
}
