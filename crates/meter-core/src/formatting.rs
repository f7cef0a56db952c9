//! Text rendering for statistics and trend reports.

use std::fmt::Write;

use crate::dates::format_date;
use crate::models::{Stats, TrendReport};
use crate::units::TARGET_UNIT;

/// Format a number with `,` thousands separators and a fixed number of
/// decimals.
///
/// # Examples
///
/// ```
/// use meter_core::formatting::format_number;
///
/// assert_eq!(format_number(1845.2, 2), "1,845.20");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if value < 0.0 && text.chars().any(|c| matches!(c, '1'..='9')) {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a gallon amount for headline figures.
///
/// ```
/// use meter_core::formatting::format_gallons;
///
/// assert_eq!(format_gallons(1845.2), "1,845.20 gal");
/// ```
pub fn format_gallons(value: f64) -> String {
    format!("{} gal", format_number(value, 2))
}

/// Render the headline statistics, one figure per line.
pub fn format_statistics(stats: &Stats) -> String {
    let rows = [
        ("Average Daily Usage", stats.mean),
        ("Median Daily Usage", stats.median),
        ("Peak Usage", stats.max),
        ("Lowest Usage", stats.min),
        ("Total Usage", stats.total),
        ("Standard Deviation", stats.std_dev),
    ];
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{label}: {}", format_gallons(value));
    }
    out
}

/// Render a trend report as the markdown block shown under "Trend Analysis".
///
/// Strength is shown to two decimals; each peak day is one
/// `- YYYY-MM-DD: <usage> gallons` line.
pub fn format_trend_summary(report: &TrendReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "### Overall Trend Analysis");
    let _ = writeln!(out, "- Overall trend: {}", report.direction);
    let _ = writeln!(out, "- Trend strength (R-value): {:.2}", report.strength);
    let _ = writeln!(out);
    let _ = writeln!(out, "### Peak Usage Days");
    for day in &report.peak_days {
        let _ = writeln!(
            out,
            "- {}: {:.2} {TARGET_UNIT}",
            format_date(day.date),
            day.usage
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TrendDirection, UsageRecord};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── format_number ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(100000.0, 1), "100,000.0");
        assert_eq!(format_number(12.346, 2), "12.35");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(-1234.4, 0), "-1,234");
    }

    #[test]
    fn test_format_number_nan() {
        assert_eq!(format_number(f64::NAN, 2), "NaN");
    }

    // ── format_statistics ─────────────────────────────────────────────────────

    #[test]
    fn test_format_statistics_lines() {
        let stats = Stats {
            mean: 1845.2,
            median: 1870.13,
            max: 2094.5456,
            min: 1570.9092,
            total: 5535.5848,
            std_dev: 262.7,
        };
        let text = format_statistics(&stats);
        assert!(text.contains("Average Daily Usage: 1,845.20 gal"));
        assert!(text.contains("Peak Usage: 2,094.55 gal"));
        assert!(text.contains("Total Usage: 5,535.58 gal"));
        assert_eq!(text.lines().count(), 6);
    }

    // ── format_trend_summary ──────────────────────────────────────────────────

    fn report_with_peaks(peaks: Vec<UsageRecord>) -> TrendReport {
        TrendReport {
            direction: TrendDirection::Increasing,
            slope: 112.2,
            intercept: 1732.9,
            strength: 0.4567,
            peak_days: peaks,
            rolling_average: Vec::new(),
            daily_change: Vec::new(),
        }
    }

    #[test]
    fn test_trend_summary_layout() {
        let report = report_with_peaks(vec![
            UsageRecord::new(ymd(2025, 2, 24), 2094.5456),
            UsageRecord::new(ymd(2025, 2, 22), 1870.13),
        ]);
        let text = format_trend_summary(&report);
        assert!(text.contains("- Overall trend: Increasing"));
        assert!(text.contains("- Trend strength (R-value): 0.46"));
        assert!(text.contains("- 2025-02-24: 2094.55 gallons"));
        assert!(text.contains("- 2025-02-22: 1870.13 gallons"));
        assert_eq!(text.lines().filter(|l| l.contains("gallons")).count(), 2);
    }

    #[test]
    fn test_trend_summary_no_peaks() {
        let text = format_trend_summary(&report_with_peaks(Vec::new()));
        assert!(text.ends_with("### Peak Usage Days\n"));
    }
}
