//! Runs in its own test binary: the variable set here is process-wide.

use configuration::{AnalysisSettings, load_config};
use std::io::Write;

#[test]
fn prefixed_environment_overrides_the_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        br#"
instruments = ["SPY", "QQQ"]
start_date = "2020-01-01"
end_date = "today"

[paths]
raw = "data/raw"
clean = "data/clean"
reports = "reports"

[feed]
data_dir = "data/source"

[analysis]
anomaly_threshold = 3.0
"#,
    )
    .unwrap();

    // SAFETY: this is the only test in the binary, so no other thread reads the environment.
    unsafe { std::env::set_var("ETF__ANALYSIS__ANOMALY_THRESHOLD", "2.5") };
    let config = load_config(file.path()).unwrap();
    unsafe { std::env::remove_var("ETF__ANALYSIS__ANOMALY_THRESHOLD") };

    assert_eq!(config.analysis.anomaly_threshold, 2.5);
    assert_eq!(config.analysis.rolling_window, AnalysisSettings::default().rolling_window);
    assert_eq!(config.instruments, vec!["SPY", "QQQ"]);
}
