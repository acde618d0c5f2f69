//! # Analytics Pipeline
//!
//! Runs the analytics core in dependency order:
//! raw table → [`Aligner`] → [`ReturnEngine`] → {[`KpiEngine`], [`AnomalyDetector`]}.
//!
//! The stages are exposed one by one so a caller can report progress between
//! them; [`Pipeline::run`] chains all of them. Any stage error aborts the
//! remaining stages.

use analytics::{KpiEngine, KpiParams, KpiReport};
use anomaly::{AnomalyDetector, AnomalyReport};
use chrono::NaiveDate;
use cleaning::{Aligner, ReturnEngine, Returns};
use configuration::AnalysisSettings;
use core_types::{RawPriceTable, ValueTable};

pub mod error;

pub use error::PipelineError;

/// The aligned closes together with the returns derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanData {
    pub closes: ValueTable,
    pub returns: Returns,
}

/// Everything a single run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub closes: ValueTable,
    pub daily_returns: ValueTable,
    pub monthly_returns: ValueTable,
    pub kpis: KpiReport,
    pub anomalies: AnomalyReport,
}

/// The configured engines of one run.
#[derive(Debug)]
pub struct Pipeline {
    aligner: Aligner,
    returns: ReturnEngine,
    kpis: KpiEngine,
    anomalies: AnomalyDetector,
}

impl Pipeline {
    /// Builds every engine from the analysis settings, failing fast on
    /// unusable parameters.
    pub fn new(settings: &AnalysisSettings) -> Result<Self, PipelineError> {
        let kpis = KpiEngine::new(KpiParams {
            trading_days_per_year: settings.trading_days_per_year,
            rolling_window: settings.rolling_window,
        })?;
        let anomalies = AnomalyDetector::z_score(settings.anomaly_threshold)?;

        Ok(Self {
            aligner: Aligner::new(),
            returns: ReturnEngine::new(),
            kpis,
            anomalies,
        })
    }

    /// Aligns the raw closes and derives daily and monthly returns.
    #[tracing::instrument(name = "clean", skip_all, fields(instruments = raw.instrument_count()))]
    pub fn clean(&self, raw: &RawPriceTable) -> Result<CleanData, PipelineError> {
        let closes = self.aligner.align(raw)?;
        let returns = self.returns.calculate(&closes)?;
        Ok(CleanData { closes, returns })
    }

    /// KPIs for the cleaned data. `today` anchors the year-to-date window.
    pub fn kpis(&self, data: &CleanData, today: NaiveDate) -> Result<KpiReport, PipelineError> {
        Ok(self.kpis.calculate(&data.closes, &data.returns.daily, today)?)
    }

    pub fn anomalies(&self, data: &CleanData) -> AnomalyReport {
        self.anomalies.detect(&data.returns.daily)
    }

    /// Runs every stage and bundles the results.
    #[tracing::instrument(name = "pipeline", skip_all, fields(%today))]
    pub fn run(&self, raw: &RawPriceTable, today: NaiveDate) -> Result<PipelineOutput, PipelineError> {
        let data = self.clean(raw)?;
        let kpis = self.kpis(&data, today)?;
        let anomalies = self.anomalies(&data);
        tracing::info!(
            rows = data.closes.len(),
            anomalies = anomalies.records.len(),
            "Pipeline completed."
        );
        Ok(data.into_output(kpis, anomalies))
    }
}

impl CleanData {
    pub fn into_output(self, kpis: KpiReport, anomalies: AnomalyReport) -> PipelineOutput {
        PipelineOutput {
            closes: self.closes,
            daily_returns: self.returns.daily,
            monthly_returns: self.returns.monthly,
            kpis,
            anomalies,
        }
    }
}
