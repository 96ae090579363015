//! Grouped sums, rankings and calendar aggregates over the cleaned table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use spend_core::models::{AmountFilter, ExpenseBand, FlowKind, Transaction};

// ── Payload types ─────────────────────────────────────────────────────────────

/// A label → summed amount pair, the unit of every ranking payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSum {
    pub label: String,
    pub total: f64,
}

/// Expense total for one calendar month (1-12), across all years present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlySum {
    pub month: u32,
    pub total: f64,
}

/// Row counts per High/Low expense band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub high: u64,
    pub low: u64,
}

/// One (category, mode, amount) observation for the distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySample {
    pub category: String,
    pub mode: String,
    pub amount: f64,
}

// ── SpendAggregator ───────────────────────────────────────────────────────────

/// Stateless helper computing the dashboard aggregates.
///
/// Every function is a pure function of its inputs; empty inputs yield
/// empty or `None` results rather than panicking.
pub struct SpendAggregator;

impl SpendAggregator {
    /// Sum of `amount` over rows with the given flow direction.
    pub fn total_for(transactions: &[Transaction], flow: FlowKind) -> f64 {
        transactions
            .iter()
            .filter(|t| t.flow == flow)
            .map(|t| t.amount)
            .sum()
    }

    /// Amounts inside the inclusive filter window, in input order.
    pub fn amounts_within(transactions: &[Transaction], filter: &AmountFilter) -> Vec<f64> {
        transactions
            .iter()
            .map(|t| t.amount)
            .filter(|a| filter.contains(*a))
            .collect()
    }

    /// Categories ranked descending by summed expense amount, truncated to
    /// `n`. Ties break lexicographically by label.
    pub fn top_categories_by_expense(transactions: &[Transaction], n: usize) -> Vec<LabeledSum> {
        let mut sums: HashMap<&str, f64> = HashMap::new();
        for t in transactions.iter().filter(|t| t.flow == FlowKind::Expense) {
            *sums.entry(t.category.as_str()).or_insert(0.0) += t.amount;
        }
        Self::rank(sums, n)
    }

    /// Payment modes ranked descending by summed amount (all flows) over
    /// rows whose category is in `categories`, truncated to `m`.
    pub fn top_modes_within(
        transactions: &[Transaction],
        categories: &[String],
        m: usize,
    ) -> Vec<LabeledSum> {
        let selected: HashSet<&str> = categories.iter().map(|c| c.as_str()).collect();
        let mut sums: HashMap<&str, f64> = HashMap::new();
        for t in transactions
            .iter()
            .filter(|t| selected.contains(t.category.as_str()))
        {
            *sums.entry(t.mode.as_str()).or_insert(0.0) += t.amount;
        }
        Self::rank(sums, m)
    }

    /// The individual observations behind the distribution chart: rows
    /// restricted to the selected categories and modes.
    pub fn category_mode_samples(
        transactions: &[Transaction],
        categories: &[String],
        modes: &[String],
    ) -> Vec<CategorySample> {
        let categories: HashSet<&str> = categories.iter().map(|c| c.as_str()).collect();
        let modes: HashSet<&str> = modes.iter().map(|m| m.as_str()).collect();
        transactions
            .iter()
            .filter(|t| categories.contains(t.category.as_str()) && modes.contains(t.mode.as_str()))
            .map(|t| CategorySample {
                category: t.category.clone(),
                mode: t.mode.clone(),
                amount: t.amount,
            })
            .collect()
    }

    /// Expense totals grouped by month number, aggregated across years.
    ///
    /// Undated rows carry no month and are skipped.
    pub fn monthly_expense_totals(transactions: &[Transaction]) -> Vec<MonthlySum> {
        let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
        for t in transactions.iter().filter(|t| t.flow == FlowKind::Expense) {
            if let Some(month) = t.month() {
                *totals.entry(month).or_insert(0.0) += t.amount;
            }
        }
        totals
            .into_iter()
            .map(|(month, total)| MonthlySum { month, total })
            .collect()
    }

    /// Row counts per expense band, over all rows.
    pub fn band_counts(transactions: &[Transaction]) -> BandCounts {
        let mut counts = BandCounts::default();
        for t in transactions {
            match t.expense_band() {
                ExpenseBand::High => counts.high += 1,
                ExpenseBand::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Mean, over the `(year, month)` groups present, of the per-group
    /// summed amount for one flow direction.
    ///
    /// Returns `None` when no dated row carries the flow.
    pub fn average_monthly_total(transactions: &[Transaction], flow: FlowKind) -> Option<f64> {
        let mut groups: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for t in transactions.iter().filter(|t| t.flow == flow) {
            if let Some(key) = t.year_month() {
                *groups.entry(key).or_insert(0.0) += t.amount;
            }
        }
        if groups.is_empty() {
            return None;
        }
        let count = groups.len() as f64;
        Some(groups.values().sum::<f64>() / count)
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Sort label/total pairs descending by total, breaking ties
    /// lexicographically by label, and keep the first `n`.
    fn rank(sums: HashMap<&str, f64>, n: usize) -> Vec<LabeledSum> {
        let mut rows: Vec<LabeledSum> = sums
            .into_iter()
            .map(|(label, total)| LabeledSum {
                label: label.to_string(),
                total,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        rows.truncate(n);
        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
