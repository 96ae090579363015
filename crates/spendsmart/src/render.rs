//! Plain-text rendering of the dashboard payload.
//!
//! Each section mirrors one panel of the dashboard. The payload already
//! carries everything chart-ready; this module only formats it.

use std::fmt::Write as _;

use spend_core::formatting::{format_inr, format_number, percentage};
use spend_data::aggregator::LabeledSum;
use spend_data::analysis::DashboardReport;

/// Render the full report as the sequence of dashboard sections.
pub fn render_report(report: &DashboardReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "SpendSmart Expense Tracker");
    let _ = writeln!(out);

    overview_section(&mut out, report);
    key_metrics_section(&mut out, report);
    distribution_section(&mut out, report);
    category_mode_section(&mut out, report);
    correlation_section(&mut out, report);
    monthly_section(&mut out, report);
    ranking_sections(&mut out, report);
    band_section(&mut out, report);
    averages_section(&mut out, report);

    out
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn overview_section(out: &mut String, report: &DashboardReport) {
    let _ = writeln!(out, "== Dataset Overview ==");
    let _ = writeln!(
        out,
        "Dataset shape: {} rows and {} columns",
        report.overview.rows, report.overview.columns
    );
    let _ = writeln!(
        out,
        "Cleaned rows: {} (dropped {} non-positive, {} incomplete)",
        report.clean_report.rows_kept,
        report.clean_report.dropped_nonpositive_amount,
        report.clean_report.dropped_incomplete
    );

    if !report.preview.is_empty() {
        let _ = writeln!(out, "Preview:");
        for tx in &report.preview {
            let date = tx
                .posted_at
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {}  {:>12}  {} / {}  [{}, {}]",
                date,
                format_inr(tx.amount),
                tx.category,
                tx.subcategory,
                tx.mode,
                tx.flow.as_str()
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "== Summary Statistics ==");
    for summary in &report.overview.numeric_summaries {
        let _ = writeln!(
            out,
            "{}: count={} mean={} std={} min={} 25%={} 50%={} 75%={} max={}",
            summary.column,
            summary.count,
            opt_number(summary.mean),
            opt_number(summary.std),
            opt_number(summary.min),
            opt_number(summary.q25),
            opt_number(summary.median),
            opt_number(summary.q75),
            opt_number(summary.max),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "== Missing Values ==");
    for column in &report.overview.missing {
        let _ = writeln!(out, "  {}: {}", column.column, column.missing);
    }
    let _ = writeln!(out);
}

fn key_metrics_section(out: &mut String, report: &DashboardReport) {
    let _ = writeln!(out, "== Key Metrics ==");
    let _ = writeln!(
        out,
        "Total Expense: {}",
        format_inr(report.aggregates.total_expense)
    );
    let _ = writeln!(
        out,
        "Total Income: {}",
        format_inr(report.aggregates.total_income)
    );
    let _ = writeln!(out);
}

fn distribution_section(out: &mut String, report: &DashboardReport) {
    let filter = &report.aggregates.amount_filter;
    let _ = writeln!(out, "== Transaction Amount Distribution ==");
    let _ = writeln!(
        out,
        "{} transactions between {} and {}",
        report.aggregates.filtered_amounts.len(),
        format_inr(filter.min),
        format_inr(filter.max)
    );
    let _ = writeln!(out);
}

fn category_mode_section(out: &mut String, report: &DashboardReport) {
    let breakdown = &report.aggregates.mode_breakdown;
    let _ = writeln!(out, "== Amount Spent per Category ==");
    labeled_list(out, "Top categories", &breakdown.categories);
    labeled_list(out, "Top modes", &breakdown.modes);
    let _ = writeln!(out, "  {} observations in view", breakdown.samples.len());
    let _ = writeln!(out);
}

fn correlation_section(out: &mut String, report: &DashboardReport) {
    let matrix = &report.aggregates.correlation;
    let _ = writeln!(out, "== Correlation Matrix ==");
    let _ = writeln!(out, "  {:>8} {}", "", matrix.columns.join(" "));
    for (name, row) in matrix.columns.iter().zip(&matrix.cells) {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(r) => format!("{:.2}", r),
                None => "n/a".to_string(),
            })
            .collect();
        let _ = writeln!(out, "  {:>8} {}", name, cells.join(" "));
    }
    let _ = writeln!(out);
}

fn monthly_section(out: &mut String, report: &DashboardReport) {
    let _ = writeln!(out, "== Monthly Expenses ==");
    if report.aggregates.monthly_expenses.is_empty() {
        let _ = writeln!(out, "  No calendar data available.");
    }
    for month in &report.aggregates.monthly_expenses {
        let _ = writeln!(out, "  Month {:>2}: {}", month.month, format_inr(month.total));
    }
    let _ = writeln!(out);
}

fn ranking_sections(out: &mut String, report: &DashboardReport) {
    let _ = writeln!(out, "== Expenses by Category ==");
    numbered_list(out, &report.aggregates.top_expense_categories);
    let _ = writeln!(out);

    let _ = writeln!(out, "== Income vs Expense Distribution ==");
    let total = report.aggregates.total_income + report.aggregates.total_expense;
    let _ = writeln!(
        out,
        "  Income: {}%  Expense: {}%",
        percentage(report.aggregates.total_income, total, 1),
        percentage(report.aggregates.total_expense, total, 1)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "== Top Spending Categories ==");
    numbered_list(out, &report.aggregates.top_spending_summary);
    let _ = writeln!(out);
}

fn band_section(out: &mut String, report: &DashboardReport) {
    let counts = &report.aggregates.band_counts;
    let _ = writeln!(out, "== High vs. Low Expenses ==");
    let _ = writeln!(out, "  High: {}  Low: {}", counts.high, counts.low);
    let _ = writeln!(out);
}

fn averages_section(out: &mut String, report: &DashboardReport) {
    let averages = &report.aggregates.monthly_averages;
    let _ = writeln!(out, "== Average Monthly Income vs Expenses ==");
    match (averages.income, averages.expense) {
        (Some(income), Some(expense)) => {
            let _ = writeln!(out, "Average Monthly Income: {}", format_inr(income));
            let _ = writeln!(out, "Average Monthly Expense: {}", format_inr(expense));
            if averages.surplus == Some(true) {
                let _ = writeln!(out, "On average, there is a monthly surplus!");
            } else {
                let _ = writeln!(out, "On average, there is a monthly deficit.");
            }
        }
        _ => {
            let _ = writeln!(out, "  Not available without dated income and expense rows.");
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn opt_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format_number(v, 2),
        None => "n/a".to_string(),
    }
}

fn labeled_list(out: &mut String, title: &str, sums: &[LabeledSum]) {
    let _ = writeln!(out, "  {}:", title);
    for sum in sums {
        let _ = writeln!(out, "    {}  {}", sum.label, format_inr(sum.total));
    }
}

fn numbered_list(out: &mut String, sums: &[LabeledSum]) {
    for (i, sum) in sums.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}  {}", i + 1, sum.label, format_inr(sum.total));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
