//! Small descriptive-statistics helpers shared by the KPI and anomaly engines.

/// Which denominator a standard deviation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deviation {
    /// `n - 1` (Bessel-corrected), used for volatility estimates.
    Sample,
    /// `n`, used for z-scores.
    Population,
}

impl Deviation {
    fn degrees_of_freedom(self) -> usize {
        match self {
            Deviation::Sample => 1,
            Deviation::Population => 0,
        }
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation of `values`, or `None` when there are not enough
/// observations for the chosen denominator.
pub fn std_dev(values: &[f64], deviation: Deviation) -> Option<f64> {
    let ddof = deviation.degrees_of_freedom();
    if values.len() <= ddof {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - ddof) as f64).sqrt())
}

/// Compounds simple returns: `prod(1 + r) - 1`. An empty sequence compounds to 0.
pub fn compound<I>(returns: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    returns.into_iter().fold(1.0, |wealth, r| wealth * (1.0 + r)) - 1.0
}

/// Scales a daily standard deviation to an annual figure.
pub fn annualize(daily_std: f64, periods_per_year: u32) -> f64 {
    daily_std * f64::from(periods_per_year).sqrt()
}
