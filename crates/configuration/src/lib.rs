use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::Instrument;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisOverrides, AnalysisSettings, Config, EndDate, FeedSettings, Paths};

/// Prefix for environment overrides, e.g. `ETF__ANALYSIS__ANOMALY_THRESHOLD=2.5`.
pub const ENV_PREFIX: &str = "ETF";

/// Loads the application configuration from a TOML file, overlaid with
/// `ETF__`-prefixed environment variables.
///
/// The result is deserialized into the strongly-typed [`Config`] and
/// validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("instruments")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.analysis.validate()?;
    config.instrument_ids()?;

    tracing::debug!(path = %path.display(), instruments = config.instruments.len(), "Configuration loaded.");
    Ok(config)
}

impl Config {
    /// Parses the configured symbols into instrument ids, rejecting an empty
    /// basket and duplicates.
    pub fn instrument_ids(&self) -> Result<Vec<Instrument>, ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one instrument must be configured".to_string(),
            ));
        }
        let mut ids: Vec<Instrument> = Vec::with_capacity(self.instruments.len());
        for symbol in &self.instruments {
            let id = Instrument::new(symbol)?;
            if ids.contains(&id) {
                return Err(ConfigError::ValidationError(format!(
                    "instrument {id} is listed more than once"
                )));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Resolves the `[start, end)` history window for a run on `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ConfigError> {
        let end = self.end_date.resolve(today);
        if self.start_date >= end {
            return Err(ConfigError::ValidationError(format!(
                "start_date {} must be before end_date {} (resolved from '{}')",
                self.start_date, end, self.end_date
            )));
        }
        Ok((self.start_date, end))
    }
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "anomaly_threshold must be a positive number, got {}",
                self.anomaly_threshold
            )));
        }
        if self.rolling_window < 2 {
            return Err(ConfigError::ValidationError(format!(
                "rolling_window must be at least 2, got {}",
                self.rolling_window
            )));
        }
        if self.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "trading_days_per_year must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
