mod bootstrap;
mod render;

use anyhow::Result;
use clap::Parser;

use spend_core::error::SpendError;
use spend_core::settings::Settings;
use spend_data::analysis::{analyze_file, DashboardConfig};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::info!("SpendSmart v{} starting", env!("CARGO_PKG_VERSION"));

    // The single terminal condition: no file supplied, nothing to analyze.
    let Some(path) = settings.file.clone() else {
        return Err(SpendError::NoInputFile.into());
    };

    let config = DashboardConfig {
        min_amount: settings.min_amount,
        max_amount: settings.max_amount,
        preview_rows: settings.preview_rows,
        style: settings.chart_style(),
    };

    let report = analyze_file(&path, &config)?;

    if report.date_column_missing {
        eprintln!("The 'Date' column does not exist in the dataset.");
    }

    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", render::render_report(&report)),
    }

    Ok(())
}
