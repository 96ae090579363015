//! Top-level dashboard pipeline.
//!
//! `compute` is the pure core: aggregates are a function of the cleaned
//! table and the host-supplied configuration, nothing else. Re-running on
//! a table or configuration change is the caller's responsibility.
//! `analyze_file` is the one-shot host path: read → overview → normalize →
//! compute, returning a [`DashboardReport`] ready for rendering.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use spend_core::error::Result;
use spend_core::models::{
    AmountFilter, ChartStyle, CleanTable, FlowKind, Transaction, DEFAULT_FILTER_MAX,
    DEFAULT_FILTER_MIN, TOP_CATEGORIES_DISTRIBUTION, TOP_CATEGORIES_RANKED,
    TOP_CATEGORIES_SUMMARY, TOP_MODES,
};

use crate::aggregator::{BandCounts, CategorySample, LabeledSum, MonthlySum, SpendAggregator};
use crate::cleaner::{normalize, CleanReport};
use crate::reader::read_csv_file;
use crate::statistics::{correlation_matrix, numeric_columns, CorrelationMatrix, DatasetOverview};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Host-supplied configuration for one pipeline run.
///
/// Unset filter bounds fall back to the default window, with the upper
/// bound clamped to the observed post-clean maximum. Explicit bounds are
/// validated strictly instead.
#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Cleaned rows included in the preview payload.
    pub preview_rows: usize,
    /// Pass-through presentation style, echoed in the payload.
    pub style: ChartStyle,
}

// ── Payload types ─────────────────────────────────────────────────────────────

/// The distribution-chart payload: top categories, the top modes within
/// them, and the underlying observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeBreakdown {
    pub categories: Vec<LabeledSum>,
    pub modes: Vec<LabeledSum>,
    pub samples: Vec<CategorySample>,
}

/// Average per-month totals and the surplus verdict.
///
/// All three fields are `None` when the table carries no dated rows for
/// the respective flow (or no calendar fields at all).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverages {
    pub income: Option<f64>,
    pub expense: Option<f64>,
    pub surplus: Option<bool>,
}

/// Every named aggregate of one pipeline run, chart-ready.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardAggregates {
    pub total_expense: f64,
    pub total_income: f64,
    /// The resolved filter actually applied.
    pub amount_filter: AmountFilter,
    /// Amounts inside the filter window, for the histogram.
    pub filtered_amounts: Vec<f64>,
    pub mode_breakdown: ModeBreakdown,
    /// Ranked expense list (top 10).
    pub top_expense_categories: Vec<LabeledSum>,
    /// Top-spending summary (top 5).
    pub top_spending_summary: Vec<LabeledSum>,
    pub correlation: CorrelationMatrix,
    pub monthly_expenses: Vec<MonthlySum>,
    pub band_counts: BandCounts,
    pub monthly_averages: MonthlyAverages,
    /// Echoed presentation style.
    pub style: ChartStyle,
}

/// Metadata produced alongside a full report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Wall-clock seconds spent reading the file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent cleaning and aggregating.
    pub compute_time_seconds: f64,
}

/// The complete output of [`analyze_file`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Pre-clean shape, missing counts and numeric summaries.
    pub overview: DatasetOverview,
    /// Head of the cleaned table.
    pub preview: Vec<Transaction>,
    /// Row-count diagnostics from normalization.
    pub clean_report: CleanReport,
    /// Set when the file carried no `Date` column; the host surfaces this
    /// as the degraded-schema error message.
    pub date_column_missing: bool,
    pub aggregates: DashboardAggregates,
    pub metadata: ReportMetadata,
}

// ── compute ───────────────────────────────────────────────────────────────────

/// Compute every named aggregate from the cleaned table and configuration.
///
/// Pure and stateless; fails only when an explicit amount filter is out of
/// range.
pub fn compute(table: &CleanTable, config: &DashboardConfig) -> Result<DashboardAggregates> {
    let tx = table.transactions.as_slice();
    let ceiling = table.max_amount().unwrap_or(f64::INFINITY);

    let amount_filter = match (config.min_amount, config.max_amount) {
        (None, None) => AmountFilter::default_for(ceiling),
        (min, max) => AmountFilter::new(
            min.unwrap_or(DEFAULT_FILTER_MIN),
            max.unwrap_or(DEFAULT_FILTER_MAX.min(ceiling)),
            ceiling,
        )?,
    };

    let distribution_categories =
        SpendAggregator::top_categories_by_expense(tx, TOP_CATEGORIES_DISTRIBUTION);
    let category_labels: Vec<String> = distribution_categories
        .iter()
        .map(|s| s.label.clone())
        .collect();
    let modes = SpendAggregator::top_modes_within(tx, &category_labels, TOP_MODES);
    let mode_labels: Vec<String> = modes.iter().map(|s| s.label.clone()).collect();
    let samples = SpendAggregator::category_mode_samples(tx, &category_labels, &mode_labels);

    // Calendar aggregates are gated on the capability flag computed at
    // ingestion, not on per-row checks.
    let (monthly_expenses, monthly_averages) = if table.has_calendar_fields {
        let income = SpendAggregator::average_monthly_total(tx, FlowKind::Income);
        let expense = SpendAggregator::average_monthly_total(tx, FlowKind::Expense);
        let surplus = income.zip(expense).map(|(i, e)| i > e);
        (
            SpendAggregator::monthly_expense_totals(tx),
            MonthlyAverages {
                income,
                expense,
                surplus,
            },
        )
    } else {
        (
            Vec::new(),
            MonthlyAverages {
                income: None,
                expense: None,
                surplus: None,
            },
        )
    };

    Ok(DashboardAggregates {
        total_expense: SpendAggregator::total_for(tx, FlowKind::Expense),
        total_income: SpendAggregator::total_for(tx, FlowKind::Income),
        filtered_amounts: SpendAggregator::amounts_within(tx, &amount_filter),
        amount_filter,
        mode_breakdown: ModeBreakdown {
            categories: distribution_categories,
            modes,
            samples,
        },
        top_expense_categories: SpendAggregator::top_categories_by_expense(
            tx,
            TOP_CATEGORIES_RANKED,
        ),
        top_spending_summary: SpendAggregator::top_categories_by_expense(
            tx,
            TOP_CATEGORIES_SUMMARY,
        ),
        correlation: correlation_matrix(&numeric_columns(table)),
        monthly_expenses,
        band_counts: SpendAggregator::band_counts(tx),
        monthly_averages,
        style: config.style.clone(),
    })
}

// ── analyze_file ──────────────────────────────────────────────────────────────

/// Run the full pipeline against a transaction file.
///
/// 1. Read the CSV into the raw table.
/// 2. Compute the pre-clean overview.
/// 3. Normalize into the cleaned table.
/// 4. Compute the aggregates.
pub fn analyze_file(path: &Path, config: &DashboardConfig) -> Result<DashboardReport> {
    let load_start = std::time::Instant::now();
    let raw = read_csv_file(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    if !raw.has_date_column {
        warn!("Dataset has no 'Date' column; monthly aggregates will be empty");
    }

    let compute_start = std::time::Instant::now();
    let overview = DatasetOverview::from_raw(&raw);
    let (table, clean_report) = normalize(&raw);
    let aggregates = compute(&table, config)?;
    let compute_time = compute_start.elapsed().as_secs_f64();

    debug!(
        "Analyzed {}: {} rows loaded, {} kept",
        path.display(),
        clean_report.rows_loaded,
        clean_report.rows_kept
    );

    let preview: Vec<Transaction> = table
        .transactions
        .iter()
        .take(config.preview_rows)
        .cloned()
        .collect();

    Ok(DashboardReport {
        overview,
        preview,
        clean_report,
        date_column_missing: !table.has_calendar_fields,
        aggregates,
        metadata: ReportMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            load_time_seconds: load_time,
            compute_time_seconds: compute_time,
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
