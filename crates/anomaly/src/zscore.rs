use crate::OutlierMethod;
use core_types::stats::{self, Deviation};

const ROUNDING_ULPS: f64 = 8.0;

/// Standard score against the whole series: `(r - mean) / stddev`.
///
/// Mean and deviation (population form) are taken over the finite values only.
/// A series with zero or undefined deviation yields no scores at all. The
/// deviation counts as zero when it is within rounding of `1 + max|r|`, the
/// magnitude returns are derived from.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZScore;

impl OutlierMethod for ZScore {
    fn name(&self) -> &'static str {
        "z-score"
    }

    fn scores(&self, values: &[f64]) -> Vec<Option<f64>> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let scale = finite.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        let moments = stats::mean(&finite)
            .zip(stats::std_dev(&finite, Deviation::Population))
            .filter(|(_, std)| std.is_finite() && *std > ROUNDING_ULPS * f64::EPSILON * (1.0 + scale));

        let Some((mean, std)) = moments else {
            return vec![None; values.len()];
        };
        values
            .iter()
            .map(|v| v.is_finite().then(|| (v - mean) / std))
            .collect()
    }
}
