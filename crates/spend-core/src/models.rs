use chrono::{Datelike, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};

// ── Display parameters ────────────────────────────────────────────────────────

/// Amount above which a transaction counts as a High expense.
pub const HIGH_EXPENSE_THRESHOLD: f64 = 1000.0;

/// Default amount-filter window applied when the host supplies no range.
pub const DEFAULT_FILTER_MIN: f64 = 0.0;
pub const DEFAULT_FILTER_MAX: f64 = 2000.0;

/// Category count for the spend-distribution view.
pub const TOP_CATEGORIES_DISTRIBUTION: usize = 12;
/// Category count for the ranked expense list.
pub const TOP_CATEGORIES_RANKED: usize = 10;
/// Category count for the top-spending summary.
pub const TOP_CATEGORIES_SUMMARY: usize = 5;
/// Payment-mode count shown inside the distribution view.
pub const TOP_MODES: usize = 3;

// ── FlowKind ──────────────────────────────────────────────────────────────────

/// Direction of a transaction: money in or money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Income,
    Expense,
}

impl FlowKind {
    /// Parse a raw `Income/Expense` cell.
    ///
    /// Matching is exact after trimming; any other label invalidates the
    /// row rather than being coerced.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Income" => Some(Self::Income),
            "Expense" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

// ── ExpenseBand ───────────────────────────────────────────────────────────────

/// Threshold classification of a transaction amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseBand {
    High,
    Low,
}

impl ExpenseBand {
    /// Classify `amount` against [`HIGH_EXPENSE_THRESHOLD`].
    ///
    /// Exactly 1000 is Low; the band is strictly greater-than.
    pub fn classify(amount: f64) -> Self {
        if amount > HIGH_EXPENSE_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Low => "Low",
        }
    }
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// A single cleaned transaction record.
///
/// Every text field is trimmed and non-null; `amount` is strictly positive.
/// `posted_at` is `None` when the source date cell existed but could not be
/// parsed (a row-level failure, not a load failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar timestamp of the transaction, when parseable.
    pub posted_at: Option<NaiveDateTime>,
    /// Monetary amount. Always `> 0` in a cleaned table.
    pub amount: f64,
    /// Spending category label.
    pub category: String,
    /// Sub-category label; `"Unknown"` when the source cell was empty.
    pub subcategory: String,
    /// Payment channel label.
    pub mode: String,
    /// Whether this row is income or expense.
    pub flow: FlowKind,
    /// Currency label.
    pub currency: String,
    /// Free-text note; empty when the source cell was empty.
    #[serde(default)]
    pub note: String,
}

impl Transaction {
    /// Day of month, when the timestamp parsed.
    pub fn day(&self) -> Option<u32> {
        self.posted_at.map(|dt| dt.day())
    }

    /// Month number 1-12, when the timestamp parsed.
    pub fn month(&self) -> Option<u32> {
        self.posted_at.map(|dt| dt.month())
    }

    /// Calendar year, when the timestamp parsed.
    pub fn year(&self) -> Option<i32> {
        self.posted_at.map(|dt| dt.year())
    }

    /// Time of day; midnight when the timestamp could not be parsed.
    pub fn time_of_day(&self) -> NaiveTime {
        self.posted_at.map(|dt| dt.time()).unwrap_or(NaiveTime::MIN)
    }

    /// High/Low classification of this row's amount.
    pub fn expense_band(&self) -> ExpenseBand {
        ExpenseBand::classify(self.amount)
    }

    /// `(year, month)` grouping key for monthly aggregates.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.posted_at.map(|dt| (dt.year(), dt.month()))
    }
}

// ── CleanTable ────────────────────────────────────────────────────────────────

/// The working table after normalization.
///
/// Invariants: every row satisfies `amount > 0` and carries no null text
/// field. `has_calendar_fields` is computed once at ingestion and consulted
/// by aggregation instead of re-checking column presence per aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanTable {
    /// Cleaned rows, in input order.
    pub transactions: Vec<Transaction>,
    /// Whether the source file carried a `Date` column at all.
    pub has_calendar_fields: bool,
}

impl CleanTable {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Largest amount in the table, or `None` when empty.
    pub fn max_amount(&self) -> Option<f64> {
        self.transactions
            .iter()
            .map(|t| t.amount)
            .fold(None, |acc, a| match acc {
                Some(m) if m >= a => Some(m),
                _ => Some(a),
            })
    }
}

// ── AmountFilter ──────────────────────────────────────────────────────────────

/// A validated inclusive amount window `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountFilter {
    pub min: f64,
    pub max: f64,
}

impl AmountFilter {
    /// Build a filter from host-supplied bounds.
    ///
    /// `ceiling` is the observed post-clean maximum amount. Fails unless
    /// `0 ≤ min ≤ max ≤ ceiling`.
    pub fn new(min: f64, max: f64, ceiling: f64) -> Result<Self> {
        if min < 0.0 || min > max || max > ceiling {
            return Err(SpendError::InvalidAmountRange { min, max, ceiling });
        }
        Ok(Self { min, max })
    }

    /// The default window `[0, 2000]`, with the upper bound clamped to the
    /// observed post-clean maximum.
    pub fn default_for(ceiling: f64) -> Self {
        Self {
            min: DEFAULT_FILTER_MIN,
            max: DEFAULT_FILTER_MAX.min(ceiling),
        }
    }

    pub fn contains(&self, amount: f64) -> bool {
        self.min <= amount && amount <= self.max
    }
}

// ── ChartStyle ────────────────────────────────────────────────────────────────

/// Categorical color choice offered by the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    MediumSeaGreen,
    LightBlue,
    Salmon,
    Coral,
    Orange,
}

impl ColorScheme {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "mediumseagreen" => Some(Self::MediumSeaGreen),
            "lightblue" => Some(Self::LightBlue),
            "salmon" => Some(Self::Salmon),
            "coral" => Some(Self::Coral),
            "orange" => Some(Self::Orange),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MediumSeaGreen => "mediumseagreen",
            Self::LightBlue => "lightblue",
            Self::Salmon => "salmon",
            Self::Coral => "coral",
            Self::Orange => "orange",
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::MediumSeaGreen
    }
}

/// Pass-through presentation configuration.
///
/// Carried untouched from the host into the payload so the renderer needs
/// no second configuration channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub color: ColorScheme,
    /// Axis label font size, 8-14.
    pub axis_font_size: u8,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            color: ColorScheme::default(),
            axis_font_size: 10,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
