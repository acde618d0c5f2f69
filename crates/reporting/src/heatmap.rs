use chrono::Datelike;
use core_types::{Instrument, ValueTable};
use std::collections::BTreeMap;

/// One instrument's monthly returns pivoted into a year × month grid.
///
/// `rows` maps each year with at least one monthly return to twelve cells,
/// January first. Months without a return are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyHeatmap {
    pub instrument: Instrument,
    pub rows: BTreeMap<i32, [Option<f64>; 12]>,
}

impl MonthlyHeatmap {
    /// Pivots one column of the monthly-returns table.
    /// Returns `None` when the instrument is not part of the table.
    pub fn from_monthly(monthly: &ValueTable, instrument: &Instrument) -> Option<Self> {
        let values = monthly.column_for(instrument)?;
        let mut rows: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
        for (date, value) in monthly.dates().iter().zip(values) {
            let cells = rows.entry(date.year()).or_insert([None; 12]);
            cells[date.month0() as usize] = Some(*value);
        }
        Some(Self {
            instrument: instrument.clone(),
            rows,
        })
    }

    /// A heatmap for every instrument, in column order.
    pub fn for_each_instrument(monthly: &ValueTable) -> Vec<Self> {
        monthly
            .instruments()
            .iter()
            .filter_map(|instrument| Self::from_monthly(monthly, instrument))
            .collect()
    }

    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.rows.get(&year)?.get(index).copied().flatten()
    }
}
