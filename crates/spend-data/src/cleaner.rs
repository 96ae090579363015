//! Normalization pipeline.
//!
//! Turns a [`RawTable`] into the cleaned working table. The step order
//! matters: later steps assume the invariants established by earlier ones.

use serde::{Deserialize, Serialize};
use tracing::debug;

use spend_core::models::{CleanTable, FlowKind, Transaction};

use crate::reader::{parse_timestamp, RawTable};

// ── CleanReport ───────────────────────────────────────────────────────────────

/// Row-count diagnostics from one normalization run.
///
/// Rows are only ever dropped, never invented:
/// `rows_loaded == rows_kept + dropped_nonpositive_amount + dropped_incomplete`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    /// Rows handed in by the reader.
    pub rows_loaded: usize,
    /// Rows dropped because the amount was null, zero or negative.
    pub dropped_nonpositive_amount: usize,
    /// Rows dropped by the strict completeness check (leftover nulls or an
    /// unrecognized income/expense label).
    pub dropped_incomplete: usize,
    /// Rows surviving into the cleaned table.
    pub rows_kept: usize,
    /// Kept rows whose date cell existed but did not parse.
    pub unparsed_dates: usize,
}

// ── normalize ─────────────────────────────────────────────────────────────────

/// Apply the cleaning steps, in order:
///
/// 1. Drop rows where `amount` is null or ≤ 0.
/// 2. Fill missing `subcategory` with `"Unknown"`, missing `note` with `""`.
/// 3. Trim whitespace from the text columns.
/// 4. Drop any remaining row containing a null (including a null date cell
///    when the column exists, and a flow label that is neither `Income`
///    nor `Expense`).
/// 5. Parse surviving date cells; unparseable values become a null
///    timestamp rather than dropping the row.
///
/// Cleaning is a projection: running it over its own output changes
/// nothing further.
pub fn normalize(raw: &RawTable) -> (CleanTable, CleanReport) {
    let mut report = CleanReport {
        rows_loaded: raw.records.len(),
        ..CleanReport::default()
    };
    let mut transactions: Vec<Transaction> = Vec::with_capacity(raw.records.len());

    for record in &raw.records {
        // Step 1: positivity filter. A null amount fails the comparison the
        // same way a non-positive one does.
        let Some(amount) = record.amount.filter(|a| *a > 0.0) else {
            report.dropped_nonpositive_amount += 1;
            continue;
        };

        // Step 2: defaults for the two optional text columns.
        let subcategory = record.subcategory.as_deref().unwrap_or("Unknown");
        let note = record.note.clone().unwrap_or_default();

        // Steps 3-4: trim, then strict completeness over what remains.
        let (Some(category), Some(mode), Some(flow_label), Some(currency)) = (
            record.category.as_deref(),
            record.mode.as_deref(),
            record.flow.as_deref(),
            record.currency.as_deref(),
        ) else {
            report.dropped_incomplete += 1;
            continue;
        };
        let Some(flow) = FlowKind::parse(flow_label) else {
            report.dropped_incomplete += 1;
            continue;
        };
        if raw.has_date_column && record.date.is_none() {
            report.dropped_incomplete += 1;
            continue;
        }

        // Step 5: calendar derivation for kept rows.
        let posted_at = if raw.has_date_column {
            let parsed = record.date.as_deref().and_then(parse_timestamp);
            if parsed.is_none() {
                report.unparsed_dates += 1;
            }
            parsed
        } else {
            None
        };

        transactions.push(Transaction {
            posted_at,
            amount,
            category: category.trim().to_string(),
            subcategory: subcategory.trim().to_string(),
            mode: mode.trim().to_string(),
            flow,
            currency: currency.trim().to_string(),
            note,
        });
    }

    report.rows_kept = transactions.len();
    debug!(
        "Cleaned {} rows: kept {}, dropped {} non-positive, {} incomplete",
        report.rows_loaded,
        report.rows_kept,
        report.dropped_nonpositive_amount,
        report.dropped_incomplete,
    );

    (
        CleanTable {
            transactions,
            has_calendar_fields: raw.has_date_column,
        },
        report,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
