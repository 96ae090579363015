//! Descriptive statistics for the overview panels and the correlation
//! heatmap.

use serde::{Deserialize, Serialize};

use spend_core::models::CleanTable;

use crate::reader::{RawRecord, RawTable};

// ── DatasetOverview ───────────────────────────────────────────────────────────

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

/// Numeric summary for one column: count, mean, spread and quartiles.
///
/// `std` is the sample standard deviation (ddof = 1) and is `None` for
/// fewer than two observations; quartiles interpolate linearly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    /// Summarize a column of observations (nulls already removed).
    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = if count > 0 {
            Some(values.iter().sum::<f64>() / count as f64)
        } else {
            None
        };
        let std = match (count, mean) {
            (n, Some(m)) if n > 1 => {
                let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            }
            _ => None,
        };

        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// The pre-clean dataset overview: shape, missing counts and numeric
/// summaries, computed before any row is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub missing: Vec<ColumnMissing>,
    pub numeric_summaries: Vec<ColumnSummary>,
}

impl DatasetOverview {
    pub fn from_raw(raw: &RawTable) -> Self {
        let missing = raw
            .columns
            .iter()
            .copied()
            .map(|column| ColumnMissing {
                column: column.to_string(),
                missing: raw
                    .records
                    .iter()
                    .filter(|r| is_missing(r, column))
                    .count(),
            })
            .collect();

        // Amount is the raw table's only numeric column.
        let amounts: Vec<f64> = raw.records.iter().filter_map(|r| r.amount).collect();
        let numeric_summaries = vec![ColumnSummary::from_values("Amount", &amounts)];

        Self {
            rows: raw.records.len(),
            columns: raw.columns.len(),
            missing,
            numeric_summaries,
        }
    }
}

/// Whether a record's cell for `column` is null.
fn is_missing(record: &RawRecord, column: &str) -> bool {
    match column {
        "Date" => record.date.is_none(),
        "Amount" => record.amount.is_none(),
        "Category" => record.category.is_none(),
        "Subcategory" => record.subcategory.is_none(),
        "Mode" => record.mode.is_none(),
        "Income/Expense" => record.flow.is_none(),
        "Currency" => record.currency.is_none(),
        "Note" => record.note.is_none(),
        _ => false,
    }
}

/// Linear-interpolation quantile over an already-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}

// ── Correlation ───────────────────────────────────────────────────────────────

/// Pairwise Pearson coefficients over the cleaned table's numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficient grid; `None` marks a degenerate pair (fewer
    /// than two complete observations, or a zero-variance column).
    pub cells: Vec<Vec<Option<f64>>>,
}

/// The numeric column vectors of a cleaned table: `Amount` always, plus
/// `Day`/`Month`/`Year` when the table carries calendar fields. Rows with
/// an unparsed date contribute nulls to the calendar columns.
pub fn numeric_columns(table: &CleanTable) -> Vec<(String, Vec<Option<f64>>)> {
    let mut columns: Vec<(String, Vec<Option<f64>>)> = vec![(
        "Amount".to_string(),
        table.transactions.iter().map(|t| Some(t.amount)).collect(),
    )];

    if table.has_calendar_fields {
        columns.push((
            "Day".to_string(),
            table
                .transactions
                .iter()
                .map(|t| t.day().map(f64::from))
                .collect(),
        ));
        columns.push((
            "Month".to_string(),
            table
                .transactions
                .iter()
                .map(|t| t.month().map(f64::from))
                .collect(),
        ));
        columns.push((
            "Year".to_string(),
            table
                .transactions
                .iter()
                .map(|t| t.year().map(f64::from))
                .collect(),
        ));
    }

    columns
}

/// Compute the pairwise Pearson matrix with pairwise-complete observations.
pub fn correlation_matrix(columns: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let names: Vec<String> = columns.iter().map(|(name, _)| name.clone()).collect();
    let n = columns.len();
    let mut cells = vec![vec![None; n]; n];

    for i in 0..n {
        for j in 0..n {
            let pairs: Vec<(f64, f64)> = columns[i]
                .1
                .iter()
                .zip(columns[j].1.iter())
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .collect();
            cells[i][j] = pearson(&pairs);
        }
    }

    CorrelationMatrix {
        columns: names,
        cells,
    }
}

/// Pearson coefficient of complete pairs; `None` for degenerate input.
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::RawRecord;
    use spend_core::models::{FlowKind, Transaction};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn record(amount: Option<f64>, category: Option<&str>) -> RawRecord {
        RawRecord {
            date: Some("2023-01-15".to_string()),
            amount,
            category: category.map(|s| s.to_string()),
            subcategory: None,
            mode: Some("Cash".to_string()),
            flow: Some("Expense".to_string()),
            currency: Some("INR".to_string()),
            note: None,
        }
    }

    fn column(name: &str, values: &[f64]) -> (String, Vec<Option<f64>>) {
        (name.to_string(), values.iter().map(|v| Some(*v)).collect())
    }

    // ── ColumnSummary ─────────────────────────────────────────────────────────

    #[test]
    fn test_column_summary_basic() {
        let summary = ColumnSummary::from_values("Amount", &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, Some(2.5));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(4.0));
        // Linear interpolation: q25 of [1,2,3,4] is 1.75, median 2.5, q75 3.25.
        assert_eq!(summary.q25, Some(1.75));
        assert_eq!(summary.median, Some(2.5));
        assert_eq!(summary.q75, Some(3.25));
        // Sample std of [1,2,3,4] is sqrt(5/3).
        let std = summary.std.unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12, "std = {std}");
    }

    #[test]
    fn test_column_summary_single_value() {
        let summary = ColumnSummary::from_values("Amount", &[7.0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, Some(7.0));
        assert_eq!(summary.std, None);
        assert_eq!(summary.median, Some(7.0));
    }

    #[test]
    fn test_column_summary_empty() {
        let summary = ColumnSummary::from_values("Amount", &[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.min, None);
        assert_eq!(summary.max, None);
        assert_eq!(summary.median, None);
    }

    // ── DatasetOverview ───────────────────────────────────────────────────────

    #[test]
    fn test_overview_counts_missing_per_column() {
        let raw = RawTable {
            records: vec![
                record(Some(10.0), Some("Food")),
                record(None, Some("Food")),
                record(Some(30.0), None),
            ],
            has_date_column: true,
            columns: vec!["Date", "Amount", "Category", "Mode"],
        };
        let overview = DatasetOverview::from_raw(&raw);

        assert_eq!(overview.rows, 3);
        assert_eq!(overview.columns, 4);
        let missing_for = |name: &str| {
            overview
                .missing
                .iter()
                .find(|m| m.column == name)
                .unwrap()
                .missing
        };
        assert_eq!(missing_for("Amount"), 1);
        assert_eq!(missing_for("Category"), 1);
        assert_eq!(missing_for("Date"), 0);
    }

    #[test]
    fn test_overview_summarizes_amount() {
        let raw = RawTable {
            records: vec![record(Some(10.0), Some("a")), record(Some(30.0), Some("b"))],
            has_date_column: true,
            columns: vec!["Amount"],
        };
        let overview = DatasetOverview::from_raw(&raw);
        assert_eq!(overview.numeric_summaries.len(), 1);
        assert_eq!(overview.numeric_summaries[0].column, "Amount");
        assert_eq!(overview.numeric_summaries[0].mean, Some(20.0));
    }

    // ── correlation_matrix ────────────────────────────────────────────────────

    #[test]
    fn test_correlation_perfectly_correlated() {
        let cols = [column("x", &[1.0, 2.0, 3.0]), column("y", &[2.0, 4.0, 6.0])];
        let matrix = correlation_matrix(&cols);
        let r = matrix.cells[0][1].unwrap();
        assert!((r - 1.0).abs() < 1e-12, "r = {r}");
    }

    #[test]
    fn test_correlation_perfectly_anticorrelated() {
        let cols = [column("x", &[1.0, 2.0, 3.0]), column("y", &[6.0, 4.0, 2.0])];
        let matrix = correlation_matrix(&cols);
        let r = matrix.cells[0][1].unwrap();
        assert!((r + 1.0).abs() < 1e-12, "r = {r}");
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let cols = [
            column("x", &[1.0, 2.0, 4.0, 8.0]),
            column("y", &[3.0, 1.0, 5.0, 2.0]),
        ];
        let matrix = correlation_matrix(&cols);
        let a = matrix.cells[0][1].unwrap();
        let b = matrix.cells[1][0].unwrap();
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_zero_variance_column_is_null() {
        let cols = [
            column("x", &[5.0, 5.0, 5.0]),
            column("y", &[1.0, 2.0, 3.0]),
        ];
        let matrix = correlation_matrix(&cols);
        // The constant column's row and column are null, diagonal included.
        assert_eq!(matrix.cells[0][0], None);
        assert_eq!(matrix.cells[0][1], None);
        assert_eq!(matrix.cells[1][0], None);
        // The varying column still correlates with itself.
        assert_eq!(matrix.cells[1][1], Some(1.0));
    }

    #[test]
    fn test_correlation_skips_incomplete_pairs() {
        // The null in x removes the (None, 9.0) pair; the rest correlate
        // perfectly.
        let cols = [
            ("x".to_string(), vec![Some(1.0), None, Some(3.0)]),
            ("y".to_string(), vec![Some(2.0), Some(9.0), Some(6.0)]),
        ];
        let matrix = correlation_matrix(&cols);
        let r = matrix.cells[0][1].unwrap();
        assert!((r - 1.0).abs() < 1e-12, "r = {r}");
    }

    // ── numeric_columns ───────────────────────────────────────────────────────

    #[test]
    fn test_numeric_columns_with_calendar() {
        let table = CleanTable {
            transactions: vec![Transaction {
                posted_at: chrono::NaiveDate::from_ymd_opt(2023, 7, 14)
                    .unwrap()
                    .and_hms_opt(0, 0, 0),
                amount: 10.0,
                category: "Food".to_string(),
                subcategory: "Unknown".to_string(),
                mode: "Cash".to_string(),
                flow: FlowKind::Expense,
                currency: "INR".to_string(),
                note: String::new(),
            }],
            has_calendar_fields: true,
        };
        let cols = numeric_columns(&table);
        let names: Vec<&str> = cols.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Amount", "Day", "Month", "Year"]);
        assert_eq!(cols[1].1[0], Some(14.0));
        assert_eq!(cols[2].1[0], Some(7.0));
        assert_eq!(cols[3].1[0], Some(2023.0));
    }

    #[test]
    fn test_numeric_columns_without_calendar() {
        let table = CleanTable {
            transactions: vec![],
            has_calendar_fields: false,
        };
        let cols = numeric_columns(&table);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].0, "Amount");
    }
}
