use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, MeterError};

// ── Raw input ─────────────────────────────────────────────────────────────────

/// One data row exactly as decoded from the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file (the header is line 1).
    pub line: u64,
    /// Untrimmed cell text in column order.
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new<S: Into<String>>(line: u64, fields: Vec<S>) -> Self {
        Self {
            line,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Cell at `index`, or `""` when the row is too short.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }
}

/// A decoded table: header row plus data rows, nothing interpreted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Header cells as received, including any byte-order mark.
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, records: Vec<RawRecord>) -> Self {
        Self { headers, records }
    }

    /// Build a table from in-memory rows, numbering them from line 2.
    pub fn from_rows<S: Into<String>>(headers: Vec<S>, rows: Vec<Vec<S>>) -> Self {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| RawRecord::new(i as u64 + 2, row))
            .collect();
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Validation outcome ────────────────────────────────────────────────────────

/// Message carried by a successful validation.
pub const VALIDATION_OK: &str = "Data validation successful";

/// Outcome of validating a [`RawTable`].
///
/// An invalid result carries the error describing the first failing check.
#[derive(Debug)]
pub enum ValidationResult {
    Valid,
    Invalid(MeterError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Human-readable outcome.
    pub fn message(&self) -> String {
        match self {
            ValidationResult::Valid => VALIDATION_OK.to_string(),
            ValidationResult::Invalid(err) => err.to_string(),
        }
    }

    /// Failure class, `None` when valid.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(err) => Some(err.kind()),
        }
    }

    /// Convert into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<(), MeterError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

// ── Canonical series ──────────────────────────────────────────────────────────

/// One day of metered usage, in gallons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub usage: f64,
}

impl UsageRecord {
    pub fn new(date: NaiveDate, usage: f64) -> Self {
        Self { date, usage }
    }
}

/// Usage records sorted ascending by date.
///
/// Equal dates keep the relative order they had in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UsageSeries {
    records: Vec<UsageRecord>,
}

impl UsageSeries {
    /// Wrap records that are already in canonical order.
    pub fn new(records: Vec<UsageRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[UsageRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UsageRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<UsageRecord> {
        self.records
    }

    /// Usage column in series order.
    pub fn usages(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.usage).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Records whose date falls within `[from, to]`; a `None` bound is open.
    pub fn between(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> UsageSeries {
        let records = self
            .records
            .iter()
            .filter(|r| from.map_or(true, |f| r.date >= f))
            .filter(|r| to.map_or(true, |t| r.date <= t))
            .copied()
            .collect();
        UsageSeries { records }
    }
}

impl<'a> IntoIterator for &'a UsageSeries {
    type Item = &'a UsageRecord;
    type IntoIter = std::slice::Iter<'a, UsageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Analysis output ───────────────────────────────────────────────────────────

/// Descriptive statistics over the usage column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
    pub total: f64,
    /// Sample standard deviation (n − 1 denominator); NaN for one record.
    pub std_dev: f64,
}

/// Sign of the fitted regression slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    /// Slope strictly above zero.
    Increasing,
    /// Slope at or below zero. A flat series lands here.
    Decreasing,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => f.write_str("Increasing"),
            TrendDirection::Decreasing => f.write_str("Decreasing"),
        }
    }
}

/// A derived value aligned to one date of the series.
///
/// `value` is `None` where the derivation is undefined (e.g. the first
/// positions of a rolling window).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Linear trend, peak days and smoothed series for one usage series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub direction: TrendDirection,
    /// Least-squares slope in gallons per row.
    pub slope: f64,
    pub intercept: f64,
    /// |Pearson r| between row index and usage, in `[0, 1]`.
    pub strength: f64,
    /// Highest-usage records, descending; ties keep series order.
    pub peak_days: Vec<UsageRecord>,
    /// Trailing moving average aligned to the series.
    pub rolling_average: Vec<SeriesPoint>,
    /// Difference from the previous record; undefined for the first.
    pub daily_change: Vec<SeriesPoint>,
}

impl TrendReport {
    /// Pre-formatted text block for display.
    pub fn summary(&self) -> String {
        crate::formatting::format_trend_summary(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_series() -> UsageSeries {
        UsageSeries::new(vec![
            UsageRecord::new(ymd(2025, 2, 22), 10.0),
            UsageRecord::new(ymd(2025, 2, 23), 20.0),
            UsageRecord::new(ymd(2025, 2, 24), 30.0),
            UsageRecord::new(ymd(2025, 2, 25), 40.0),
        ])
    }

    // ── RawTable ─────────────────────────────────────────────────────────────

    #[test]
    fn test_from_rows_numbers_lines_after_header() {
        let table = RawTable::from_rows(vec!["a", "b"], vec![vec!["1", "2"], vec!["3", "4"]]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[1].line, 3);
        assert_eq!(table.records[1].field(1), "4");
        assert_eq!(table.records[1].field(9), "");
    }

    // ── ValidationResult ─────────────────────────────────────────────────────

    #[test]
    fn test_validation_result_valid() {
        let result = ValidationResult::Valid;
        assert!(result.is_valid());
        assert_eq!(result.message(), VALIDATION_OK);
        assert_eq!(result.kind(), None);
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn test_validation_result_invalid() {
        let result = ValidationResult::Invalid(MeterError::EmptySeries);
        assert!(!result.is_valid());
        assert_eq!(result.kind(), Some(ErrorKind::EmptySeries));
        assert!(matches!(result.into_result(), Err(MeterError::EmptySeries)));
    }

    // ── UsageSeries ──────────────────────────────────────────────────────────

    #[test]
    fn test_series_accessors() {
        let series = sample_series();
        assert_eq!(series.len(), 4);
        assert!(!series.is_empty());
        assert_eq!(series.usages(), vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(series.first_date(), Some(ymd(2025, 2, 22)));
        assert_eq!(series.last_date(), Some(ymd(2025, 2, 25)));
    }

    #[test]
    fn test_series_between_inclusive() {
        let series = sample_series();
        let window = series.between(Some(ymd(2025, 2, 23)), Some(ymd(2025, 2, 24)));
        assert_eq!(window.usages(), vec![20.0, 30.0]);
    }

    #[test]
    fn test_series_between_open_bounds() {
        let series = sample_series();
        assert_eq!(series.between(None, None), series);
        assert_eq!(series.between(Some(ymd(2025, 2, 25)), None).len(), 1);
        assert_eq!(series.between(None, Some(ymd(2025, 2, 21))).len(), 0);
    }

    // ── TrendDirection ───────────────────────────────────────────────────────

    #[test]
    fn test_direction_from_slope() {
        assert_eq!(TrendDirection::from_slope(0.5), TrendDirection::Increasing);
        assert_eq!(TrendDirection::from_slope(-0.5), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::from_slope(0.0), TrendDirection::Decreasing);
    }

    #[test]
    fn test_series_serializes_as_array() {
        let series = UsageSeries::new(vec![UsageRecord::new(ymd(2025, 2, 22), 1.5)]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"date":"2025-02-22","usage":1.5}]"#);
    }
}
