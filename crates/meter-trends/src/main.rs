mod bootstrap;

use anyhow::{Context, Result};
use meter_core::error::MeterError;
use meter_core::settings::Settings;
use meter_data::analysis::{analyze_file, AnalysisResult, PipelineOptions};
use meter_data::analyzer::AnalyzerConfig;
use meter_data::export::write_series_file;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Meter Trends v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&settings) {
        Ok(()) => Ok(()),
        Err(err) if settings.is_json() => {
            // Keep stdout machine-readable even on failure.
            let kind = err.downcast_ref::<MeterError>().map(|e| e.kind());
            let body = serde_json::json!({
                "error": {
                    "kind": kind,
                    "message": format!("{err:#}"),
                }
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
        Err(err) => Err(err),
    }
}

fn run(settings: &Settings) -> Result<()> {
    let (from, to) = settings.date_range()?;
    let options = PipelineOptions {
        skip_validation: settings.skip_validation,
        from,
        to,
        analyzer: AnalyzerConfig {
            rolling_window: settings.rolling_window as usize,
            peak_count: settings.peak_days as usize,
        },
    };

    tracing::info!(
        "Analysing {} (window {}, peaks {})",
        settings.input.display(),
        options.analyzer.rolling_window,
        options.analyzer.peak_count
    );

    let result = analyze_file(&settings.input, &options)
        .with_context(|| format!("analysing {}", settings.input.display()))?;

    if let Some(path) = &settings.export {
        write_series_file(&result.series, path)
            .with_context(|| format!("exporting series to {}", path.display()))?;
        tracing::info!("Exported {} records to {}", result.series.len(), path.display());
    }

    if settings.is_json() {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text_report(&result);
    }

    Ok(())
}

fn print_text_report(result: &AnalysisResult) {
    let meta = &result.metadata;
    if let (Some(first), Some(last)) = (meta.first_date, meta.last_date) {
        println!(
            "Water usage from {first} to {last} ({} records)",
            meta.records_analyzed
        );
        println!();
    }
    print!("{}", result.summary());
    if meta.rows_dropped > 0 {
        println!();
        println!("Skipped {} rows with missing data", meta.rows_dropped);
    }
}
