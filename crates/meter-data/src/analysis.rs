//! End-to-end analysis pipeline.
//!
//! Runs validation, normalization, date filtering, statistics and trend
//! analysis, returning an [`AnalysisResult`] ready for display or export.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use meter_core::error::Result;
use meter_core::models::{RawTable, Stats, TrendReport, UsageSeries};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::{AnalyzerConfig, UsageAnalyzer};
use crate::normalizer::normalize_with_report;
use crate::reader::read_table;
use crate::validator::validate;

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Go straight to normalization. The normalizer still rejects bad data.
    pub skip_validation: bool,
    /// Inclusive lower date bound applied after normalization.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound applied after normalization.
    pub to: Option<NaiveDate>,
    pub analyzer: AnalyzerConfig,
}

/// Facts about one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Data rows in the raw table.
    pub rows_read: usize,
    /// Rows dropped by the normalizer for a blank date or quantity.
    pub rows_dropped: usize,
    /// Records left after the date filter.
    pub records_analyzed: usize,
    /// Whether the validator ran before normalization.
    pub validated: bool,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// The complete output of [`analyze_table`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Canonical series after the date filter.
    pub series: UsageSeries,
    pub statistics: Stats,
    pub trends: TrendReport,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Text block combining headline statistics and the trend summary.
    pub fn summary(&self) -> String {
        format!(
            "{}\n{}",
            meter_core::formatting::format_statistics(&self.statistics),
            self.trends.summary()
        )
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over an in-memory table.
///
/// 1. Validate (unless `skip_validation`); an invalid table fails with the
///    validator's error.
/// 2. Normalize into a canonical series.
/// 3. Keep records inside `[from, to]`.
/// 4. Compute statistics and trends; an empty series fails with
///    `EmptySeries`.
pub fn analyze_table(table: &RawTable, options: &PipelineOptions) -> Result<AnalysisResult> {
    // ── Step 1: Validate ──────────────────────────────────────────────────────
    let validated = !options.skip_validation;
    if validated {
        validate(table).into_result()?;
        debug!("Validation passed for {} rows", table.len());
    }

    // ── Step 2: Normalize ─────────────────────────────────────────────────────
    let normalized = normalize_with_report(table)?;

    // ── Step 3: Filter ────────────────────────────────────────────────────────
    let series = if options.from.is_some() || options.to.is_some() {
        let filtered = normalized.series.between(options.from, options.to);
        debug!(
            "Date filter kept {} of {} records",
            filtered.len(),
            normalized.series.len()
        );
        filtered
    } else {
        normalized.series
    };

    // ── Step 4: Analyse ───────────────────────────────────────────────────────
    let analyzer = UsageAnalyzer::new(options.analyzer);
    let statistics = analyzer.statistics(&series)?;
    let trends = analyzer.trends(&series)?;

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_read: table.len(),
        rows_dropped: normalized.dropped_rows,
        records_analyzed: series.len(),
        validated,
        first_date: series.first_date(),
        last_date: series.last_date(),
    };

    info!(
        "Analysed {} records ({} to {}), trend {}",
        metadata.records_analyzed,
        metadata.first_date.map(|d| d.to_string()).unwrap_or_default(),
        metadata.last_date.map(|d| d.to_string()).unwrap_or_default(),
        trends.direction
    );

    Ok(AnalysisResult {
        series,
        statistics,
        trends,
        metadata,
    })
}

/// Read the CSV at `path` and run [`analyze_table`] on it.
pub fn analyze_file(path: &Path, options: &PipelineOptions) -> Result<AnalysisResult> {
    let table = read_table(path)?;
    analyze_table(&table, options)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use meter_core::error::{ErrorKind, MeterError};
    use meter_core::models::TrendDirection;
    use tempfile::TempDir;

    const HEADERS: [&str; 4] = ["Access Code", "Time Interval", "Consumption", "Units"];

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::from_rows(HEADERS.to_vec(), rows)
    }

    fn scenario() -> RawTable {
        table(vec![
            vec!["12345", "02/22/2025", "2.5", "CCF"],
            vec!["12345", "02/23/2025", "2.1", "CCF"],
            vec!["12345", "02/24/2025", "2.8", "CCF"],
        ])
    }

    // ── analyze_table ─────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_table_scenario() {
        let result = analyze_table(&scenario(), &PipelineOptions::default()).unwrap();
        assert_eq!(result.series.len(), 3);
        assert!((result.statistics.mean - 1845.20).abs() < 0.01);
        assert_eq!(result.trends.peak_days[0].date, ymd(2025, 2, 24));
        assert_eq!(result.trends.direction, TrendDirection::Increasing);
        assert_eq!(result.metadata.rows_read, 3);
        assert_eq!(result.metadata.rows_dropped, 0);
        assert!(result.metadata.validated);
        assert_eq!(result.metadata.first_date, Some(ymd(2025, 2, 22)));
        assert_eq!(result.metadata.last_date, Some(ymd(2025, 2, 24)));

        let summary = result.summary();
        assert!(summary.contains("Average Daily Usage: 1,845.19 gal"));
        assert!(summary.contains("- 2025-02-24: 2094.55 gallons"));
    }

    #[test]
    fn test_analyze_table_validation_failure_propagates() {
        let raw = table(vec![vec!["1", "02/22/2025", "-1", "CCF"]]);
        let err = analyze_table(&raw, &PipelineOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_analyze_table_skip_validation_still_rejects() {
        let raw = table(vec![vec!["1", "02/22/2025", "2", "ccm"]]);
        let options = PipelineOptions {
            skip_validation: true,
            ..Default::default()
        };
        let err = analyze_table(&raw, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unit);
    }

    #[test]
    fn test_analyze_table_skip_validation_drops_blank_rows() {
        let raw = table(vec![
            vec!["1", "02/22/2025", "2", "CCF"],
            vec!["1", "", "", ""],
        ]);
        let options = PipelineOptions {
            skip_validation: true,
            ..Default::default()
        };
        let result = analyze_table(&raw, &options).unwrap();
        assert_eq!(result.metadata.rows_dropped, 1);
        assert_eq!(result.metadata.records_analyzed, 1);
        assert!(!result.metadata.validated);
    }

    #[test]
    fn test_analyze_table_date_filter() {
        let options = PipelineOptions {
            from: Some(ymd(2025, 2, 23)),
            ..Default::default()
        };
        let result = analyze_table(&scenario(), &options).unwrap();
        assert_eq!(result.series.len(), 2);
        assert_eq!(result.metadata.first_date, Some(ymd(2025, 2, 23)));
    }

    #[test]
    fn test_analyze_table_filter_to_nothing_is_empty_series() {
        let options = PipelineOptions {
            to: Some(ymd(2024, 1, 1)),
            ..Default::default()
        };
        let err = analyze_table(&scenario(), &options).unwrap_err();
        assert!(matches!(err, MeterError::EmptySeries));
    }

    #[test]
    fn test_analyze_table_headers_only_is_empty_series() {
        let err = analyze_table(&table(Vec::new()), &PipelineOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptySeries);
    }

    // ── analyze_file ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_file_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("usage.csv");
        std::fs::write(
            &path,
            "\u{feff}Access Code,Time Interval,Consumption,Units\n\
             12345,02/24/2025,2.8,CCF\n\
             12345,02/22/2025,2.5,ccf\n\
             12345,02/23/2025,2.1, CCF\n",
        )
        .unwrap();

        let result = analyze_file(&path, &PipelineOptions::default()).unwrap();
        let dates: Vec<NaiveDate> = result.series.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![ymd(2025, 2, 22), ymd(2025, 2, 23), ymd(2025, 2, 24)]);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = analyze_table(&scenario(), &PipelineOptions::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["trends"]["direction"], "Increasing");
        assert_eq!(json["series"].as_array().unwrap().len(), 3);
        assert!(json["trends"]["rolling_average"][0]["value"].is_null());
        assert_eq!(json["metadata"]["records_analyzed"], 3);
    }
}
