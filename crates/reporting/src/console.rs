use analytics::KpiSummary;
use anomaly::{AnomalySummaryRow, FlaggedReturn};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Renders the KPI summary as a terminal table.
pub fn kpi_table(summary: &KpiSummary) -> Table {
    let mut table = new_table(vec![
        "Instrument",
        "Annualized Volatility",
        "Maximum Drawdown",
        "YTD Return",
        "Total Return",
    ]);
    for row in &summary.rows {
        let ytd = if row.ytd_observations == 0 {
            "n/a".to_string()
        } else {
            percent(row.ytd_return)
        };
        table.add_row(vec![
            Cell::new(&row.instrument),
            number(row.annualized_volatility.map(percent).unwrap_or_else(|| "n/a".to_string())),
            number(percent(row.max_drawdown)),
            number(ytd),
            number(percent(row.total_return)),
        ]);
    }
    table
}

/// Renders the anomaly summary as a terminal table.
pub fn anomaly_table(summary: &[AnomalySummaryRow]) -> Table {
    let mut table = new_table(vec![
        "Instrument",
        "Anomaly Count",
        "Worst Return",
        "Worst Date",
        "Largest Return",
        "Largest Date",
    ]);
    let value = |event: Option<FlaggedReturn>| event.map(|e| percent(e.daily_return)).unwrap_or_default();
    let date = |event: Option<FlaggedReturn>| event.map(|e| e.date.to_string()).unwrap_or_default();
    for row in summary {
        table.add_row(vec![
            Cell::new(&row.instrument),
            number(row.count.to_string()),
            number(value(row.worst)),
            Cell::new(date(row.worst)),
            number(value(row.largest)),
            Cell::new(date(row.largest)),
        ]);
    }
    table
}
