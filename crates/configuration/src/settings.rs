use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The basket of instrument identifiers to analyse (e.g., ["SPY", "QQQ"]).
    pub instruments: Vec<String>,
    /// First date of the history window (inclusive).
    pub start_date: NaiveDate,
    /// End of the history window (exclusive). Either a date or `"today"`.
    pub end_date: EndDate,
    pub paths: Paths,
    pub feed: FeedSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// The end of the requested history window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum EndDate {
    /// Resolved against the run date at startup.
    Today,
    Fixed(NaiveDate),
}

impl EndDate {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            EndDate::Today => today,
            EndDate::Fixed(date) => date,
        }
    }
}

impl TryFrom<String> for EndDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().eq_ignore_ascii_case("today") {
            return Ok(EndDate::Today);
        }
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(EndDate::Fixed)
            .map_err(|e| format!("end_date must be 'today' or YYYY-MM-DD, got '{value}': {e}"))
    }
}

impl fmt::Display for EndDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndDate::Today => f.write_str("today"),
            EndDate::Fixed(date) => write!(f, "{date}"),
        }
    }
}

/// Output directories. Each is created on demand by the writers.
#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    /// Where the raw provider table is saved.
    pub raw: PathBuf,
    /// Aligned closes and return tables.
    pub clean: PathBuf,
    /// KPI and anomaly summaries, heatmaps and series tables.
    pub reports: PathBuf,
    /// Daily-rolling log files. Logging to file is disabled when absent.
    #[serde(default)]
    pub logs: Option<PathBuf>,
}

/// Settings for the file-backed source feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    /// Directory holding one `<INSTRUMENT>.csv` provider export per instrument.
    pub data_dir: PathBuf,
}

/// Parameters threaded into the KPI and anomaly engines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Absolute z-score above which a daily return is flagged.
    pub anomaly_threshold: f64,
    /// Number of trailing daily returns in each rolling-volatility window.
    pub rolling_window: usize,
    /// Trading days used to annualize daily volatility.
    pub trading_days_per_year: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            anomaly_threshold: 3.0,
            rolling_window: 30,
            trading_days_per_year: 252,
        }
    }
}

impl AnalysisSettings {
    /// Returns a copy with every override that was supplied applied on top.
    pub fn with_overrides(&self, overrides: &AnalysisOverrides) -> Self {
        Self {
            anomaly_threshold: overrides.threshold.unwrap_or(self.anomaly_threshold),
            rolling_window: overrides.rolling_window.unwrap_or(self.rolling_window),
            trading_days_per_year: self.trading_days_per_year,
        }
    }
}

/// Command-line overrides for [`AnalysisSettings`]. Unset fields keep the file value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct AnalysisOverrides {
    /// Override the anomaly z-score threshold.
    #[cfg_attr(feature = "clap", arg(long))]
    pub threshold: Option<f64>,
    /// Override the rolling-volatility window length.
    #[cfg_attr(feature = "clap", arg(long))]
    pub rolling_window: Option<usize>,
}
