use clap::Parser;
use std::path::PathBuf;

use crate::models::{ChartStyle, ColorScheme};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Transaction analytics dashboard for personal expense tracking
#[derive(Parser, Debug, Clone)]
#[command(
    name = "spendsmart",
    about = "Transaction analytics dashboard for personal expense tracking",
    version
)]
pub struct Settings {
    /// Path to the transaction CSV file
    pub file: Option<PathBuf>,

    /// Lower bound of the amount filter
    #[arg(long)]
    pub min_amount: Option<f64>,

    /// Upper bound of the amount filter
    #[arg(long)]
    pub max_amount: Option<f64>,

    /// Color scheme for rendered charts
    #[arg(long, default_value = "mediumseagreen", value_parser = ["mediumseagreen", "lightblue", "salmon", "coral", "orange"])]
    pub color: String,

    /// Axis label font size (8-14)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u8).range(8..=14))]
    pub font_size: u8,

    /// Number of cleaned rows shown in the dataset preview
    #[arg(long, default_value = "5")]
    pub preview_rows: usize,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Effective log level; `--debug` overrides `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// Presentation style assembled from the sidebar-equivalent flags.
    ///
    /// The color string is pre-validated by clap, so the fallback here is
    /// unreachable in practice.
    pub fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            color: ColorScheme::parse(&self.color).unwrap_or_default(),
            axis_font_size: self.font_size,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
