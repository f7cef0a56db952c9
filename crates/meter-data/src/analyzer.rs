//! Descriptive statistics and trend signals over a canonical usage series.
//!
//! Both entry points refuse an empty series with
//! [`MeterError::EmptySeries`] instead of returning NaN.

use meter_core::error::{MeterError, Result};
use meter_core::models::{SeriesPoint, Stats, TrendDirection, TrendReport, UsageRecord, UsageSeries};

/// Trailing window of the rolling average, in records.
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

/// Number of peak-usage days reported.
pub const DEFAULT_PEAK_COUNT: usize = 3;

// ── AnalyzerConfig ────────────────────────────────────────────────────────────

/// Tunable parameters of the trend analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Records averaged by the trailing rolling mean (minimum 1).
    pub rolling_window: usize,
    /// How many highest-usage records to report.
    pub peak_count: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            peak_count: DEFAULT_PEAK_COUNT,
        }
    }
}

// ── UsageAnalyzer ─────────────────────────────────────────────────────────────

/// Computes [`Stats`] and [`TrendReport`]s for usage series.
#[derive(Debug, Clone, Default)]
pub struct UsageAnalyzer {
    config: AnalyzerConfig,
}

impl UsageAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Mean, median, max, min, sum and sample standard deviation of usage.
    ///
    /// The standard deviation divides by `n - 1`, so a single-record series
    /// yields NaN for it.
    pub fn statistics(&self, series: &UsageSeries) -> Result<Stats> {
        if series.is_empty() {
            return Err(MeterError::EmptySeries);
        }
        let values = series.usages();
        let n = values.len() as f64;

        let total: f64 = values.iter().sum();
        let mean = total / n;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let squared_dev: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        let std_dev = (squared_dev / (n - 1.0)).sqrt();

        Ok(Stats {
            mean,
            median: median(&values),
            max,
            min,
            total,
            std_dev,
        })
    }

    /// Linear trend against row index, peak days, rolling average and
    /// day-over-day change.
    ///
    /// The regression's independent variable is the zero-based row position,
    /// not the date, so gaps between dates are ignored.
    pub fn trends(&self, series: &UsageSeries) -> Result<TrendReport> {
        if series.is_empty() {
            return Err(MeterError::EmptySeries);
        }
        let values = series.usages();
        let fit = linear_fit(&values);

        let align = |derived: Vec<Option<f64>>| -> Vec<SeriesPoint> {
            series
                .iter()
                .zip(derived)
                .map(|(record, value)| SeriesPoint {
                    date: record.date,
                    value,
                })
                .collect()
        };

        Ok(TrendReport {
            direction: TrendDirection::from_slope(fit.slope),
            slope: fit.slope,
            intercept: fit.intercept,
            strength: fit.correlation.abs(),
            peak_days: peak_days(series.records(), self.config.peak_count),
            rolling_average: align(rolling_mean(&values, self.config.rolling_window)),
            daily_change: align(differences(&values)),
        })
    }
}

/// [`UsageAnalyzer::statistics`] with the default configuration.
pub fn statistics(series: &UsageSeries) -> Result<Stats> {
    UsageAnalyzer::with_defaults().statistics(series)
}

/// [`UsageAnalyzer::trends`] with the default configuration.
pub fn trends(series: &UsageSeries) -> Result<TrendReport> {
    UsageAnalyzer::with_defaults().trends(series)
}

// ── Numeric helpers ───────────────────────────────────────────────────────────

/// Ordinary least-squares fit of `values[i]` against `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation between index and value.
    pub correlation: f64,
}

/// Fit `y = slope * i + intercept` over `values`.
///
/// A constant series (including a single value) has no variance, so its
/// correlation is undefined; it is reported as 0 with a slope of 0.
pub fn linear_fit(values: &[f64]) -> LinearFit {
    if values.is_empty() {
        return LinearFit {
            slope: 0.0,
            intercept: 0.0,
            correlation: 0.0,
        };
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let constant = values.iter().all(|&v| v == values[0]);
    if constant {
        return LinearFit {
            slope: 0.0,
            intercept: y_mean,
            correlation: 0.0,
        };
    }

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let correlation = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
        correlation,
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// The `count` highest-usage records, descending.
///
/// The sort is stable, so records with equal usage stay in series order.
pub fn peak_days(records: &[UsageRecord], count: usize) -> Vec<UsageRecord> {
    let mut ranked: Vec<&UsageRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.usage.total_cmp(&a.usage));
    ranked.into_iter().take(count).copied().collect()
}

/// Trailing mean over `window` values; the first `window - 1` positions are
/// `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// `values[i] - values[i - 1]`, with `None` at position 0.
pub fn differences(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
    }
    out.extend(values.windows(2).map(|w| Some(w[1] - w[0])));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
