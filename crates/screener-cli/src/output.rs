//! Report rendering.

use screener::{Report, ScreenOutcome};
use tabled::{Table, builder::Builder, settings::Style};

const NAME_WIDTH: usize = 30;
const SECTOR_WIDTH: usize = 20;
const NOT_AVAILABLE: &str = "N/A";

const HEADERS: [&str; 11] = [
    "Rank",
    "Ticker",
    "Name",
    "Sector",
    "Market Cap",
    "Price",
    "TD Score",
    "Score %",
    "ROE %",
    "D/E",
    "Sharpe",
];

fn truncate(text: Option<&str>, width: usize) -> String {
    text.unwrap_or_default().chars().take(width).collect()
}

/// Zero and absent both render as N/A.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

pub(crate) fn market_cap(value: Option<f64>) -> String {
    present(value).map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("₹{:.1}B", v / 1e9))
}

pub(crate) fn price(value: Option<f64>) -> String {
    present(value).map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("₹{v:.1}"))
}

pub(crate) fn roe_percent(value: Option<f64>) -> String {
    present(value).map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.1}", v * 100.0))
}

pub(crate) fn debt_to_equity(value: Option<f64>) -> String {
    present(value).map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.1}"))
}

fn report_row(rank: usize, report: &Report) -> [String; 11] {
    [
        rank.to_string(),
        report.ticker().unwrap_or_default().to_string(),
        truncate(report.name(), NAME_WIDTH),
        truncate(report.sector(), SECTOR_WIDTH),
        market_cap(report.market_cap()),
        price(report.price()),
        report.total_score().to_string(),
        format!("{:.2}", report.score_percentage()),
        roe_percent(report.return_on_equity()),
        debt_to_equity(report.debt_to_equity()),
        format!("{:.2}", report.sharpe_ratio()),
    ]
}

/// Ranked summary table, one row per report in the given order.
pub(crate) fn reports_table(reports: &[Report]) -> String {
    let mut builder = Builder::default();
    builder.push_record(HEADERS);
    for (i, report) in reports.iter().enumerate() {
        builder.push_record(report_row(i + 1, report));
    }
    let mut table = Table::from(builder);
    table.with(Style::psql());
    table.to_string()
}

/// Per-category breakdown of a single report.
pub(crate) fn breakdown_table(report: &Report) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Category", "Points", "Max"]);
    for (category, points) in report.breakdown().iter() {
        builder.push_record([
            category.label().to_string(),
            points.to_string(),
            category.cap().to_string(),
        ]);
    }
    builder.push_record([
        "Total".to_string(),
        report.total_score().to_string(),
        screener::MAX_SCORE.to_string(),
    ]);
    let mut table = Table::from(builder);
    table.with(Style::psql());
    table.to_string()
}

/// Full single-ticker report.
pub(crate) fn print_report(report: &Report) {
    println!("{}", reports_table(std::slice::from_ref(report)));
    println!();
    println!("{}", breakdown_table(report));
    println!();
    println!("Forensic ratio (OCF / net income): {:.2}", report.forensic_ratio());
    if report.forensic_red_flag() {
        println!("Forensic red flag: operating cash flow trails net profit");
    }
}

/// Ranked screen results followed by any failures.
pub(crate) fn print_outcome(outcome: &ScreenOutcome, min_score: f64) {
    println!("\nStocks with TD Score >= {min_score}%");
    if outcome.reports.is_empty() {
        println!("(none)");
    } else {
        println!("{}", reports_table(&outcome.reports));
    }

    println!(
        "\nScanned {} tickers, {} matched, {} failed{}",
        outcome.scanned,
        outcome.reports.len(),
        outcome.failures.len(),
        if outcome.cancelled { " (cancelled)" } else { "" }
    );
    for failure in &outcome.failures {
        eprintln!("  {}: {}", failure.symbol, failure.error);
    }
}
