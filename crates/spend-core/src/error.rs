use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the SpendSmart pipeline.
///
/// Only load-level failures live here. Row-level conditions (unparseable
/// dates, non-positive amounts, leftover nulls) are absorbed during
/// cleaning and surface as counters, never as errors.
#[derive(Error, Debug)]
pub enum SpendError {
    /// No transaction file was supplied. The single terminal condition:
    /// processing halts with a user-visible prompt and no partial output.
    #[error("No transaction file supplied. Please provide a CSV file to continue.")]
    NoInputFile,

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV stream was malformed beyond row-level recovery.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Required column '{0}' is missing from the dataset")]
    MissingColumn(&'static str),

    /// The host supplied an amount-range filter outside the valid window.
    #[error("Invalid amount range [{min}, {max}]: bounds must satisfy 0 <= min <= max <= {ceiling}")]
    InvalidAmountRange { min: f64, max: f64, ceiling: f64 },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SpendError>;
