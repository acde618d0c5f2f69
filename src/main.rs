use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::{AnalysisOverrides, Config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::Pipeline;
use price_feed::{CsvPriceFeed, fetch_basket};
use reporting::{anomaly_table, kpi_table, persist_all};
use std::path::{Path, PathBuf};
use tracing::Instrument;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// The main entry point for the ETF analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => handle_run(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Risk, performance and anomaly analytics for a basket of ETFs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load price history, compute the KPIs and anomalies, and save the reports.
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: AnalysisOverrides,

    /// Run as if today were this date (format: YYYY-MM-DD). Anchors the
    /// "today" end date and the year-to-date window.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Print the summaries without writing any files.
    #[arg(long)]
    no_persist: bool,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: `RUST_LOG` filtering (default `info`),
/// stderr output, and a daily-rolling log file when a log directory is set.
///
/// The returned guard flushes the file writer and must be held until exit.
fn init_logging(logs: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match logs {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "etf-analytics.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Handles configuration, logging setup, and the tagged run itself.
async fn handle_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    let _guard = init_logging(config.paths.logs.as_deref())?;

    let run_id = Uuid::new_v4();
    run(args, config)
        .instrument(tracing::info_span!("run", %run_id))
        .await
}

/// Runs the five steps: load, clean, KPIs, anomalies, export.
async fn run(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let today = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let settings = config.analysis.with_overrides(&args.overrides);
    settings.validate()?;

    let instruments = config.instrument_ids()?;
    let (start, end) = config.date_range(today)?;
    let pipeline = Pipeline::new(&settings)?;

    tracing::info!(
        instruments = instruments.len(),
        %start,
        %end,
        threshold = settings.anomaly_threshold,
        rolling_window = settings.rolling_window,
        "Starting analytics run."
    );

    // Set up the progress bar
    let progress_bar = ProgressBar::new(5);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    progress_bar.set_message("Loading price history...");
    let feed = CsvPriceFeed::new(&config.feed.data_dir);
    tracing::debug!(data_dir = %feed.data_dir().display(), "Reading provider exports.");
    let raw = fetch_basket(&feed, &instruments, start, end)
        .await
        .context("failed to load price history")?;
    progress_bar.inc(1);

    progress_bar.set_message("Cleaning data...");
    let data = pipeline.clean(&raw)?;
    progress_bar.inc(1);

    progress_bar.set_message("Computing KPIs...");
    let kpis = pipeline.kpis(&data, today)?;
    progress_bar.inc(1);

    progress_bar.set_message("Detecting anomalies...");
    let anomalies = pipeline.anomalies(&data);
    progress_bar.inc(1);

    let output = data.into_output(kpis, anomalies);

    if args.no_persist {
        tracing::info!("Skipping file output (--no-persist).");
    } else {
        progress_bar.set_message("Saving reports...");
        let written = persist_all(&config.paths, &raw, &output).context("failed to save reports")?;
        tracing::info!(files = written.len(), reports = %config.paths.reports.display(), "Reports saved.");
    }
    progress_bar.inc(1);
    progress_bar.finish_with_message("Run complete!");

    println!("\nKPI Summary");
    println!("{}", kpi_table(&output.kpis.summary));
    println!("\nAnomaly Summary (|z| > {})", settings.anomaly_threshold);
    println!("{}", anomaly_table(&output.anomalies.summary));

    Ok(())
}
