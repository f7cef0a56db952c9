use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::{MeterError, Result};

const REPORT_FORMATS: [&str; 2] = ["text", "json"];
const ROLLING_WINDOW_RANGE: RangeInclusive<i64> = 1..=365;
const PEAK_DAYS_RANGE: RangeInclusive<i64> = 1..=31;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Water usage statistics and trends from utility-meter CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meter-trends",
    about = "Water usage statistics and trends from utility-meter CSV exports",
    version
)]
pub struct Settings {
    /// Meter export to analyse (Access Code, Time Interval, Consumption, Units)
    pub input: PathBuf,

    /// Report format
    #[arg(long, default_value = "text", value_parser = REPORT_FORMATS)]
    pub format: String,

    /// Write the normalised date,usage series to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Only analyse days on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_iso_date)]
    pub from: Option<NaiveDate>,

    /// Only analyse days on or before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_iso_date)]
    pub to: Option<NaiveDate>,

    /// Normalise without running the validator first
    #[arg(long)]
    pub skip_validation: bool,

    /// Rolling-average window in days (1-365)
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(ROLLING_WINDOW_RANGE))]
    pub rolling_window: u32,

    /// Number of peak-usage days to report (1-31)
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(PEAK_DAYS_RANGE))]
    pub peak_days: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

fn parse_iso_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {raw:?}: {e}"))
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Report preferences persisted to `~/.meter-trends/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_window: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_days: Option<u32>,
}

impl LastUsedParams {
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".meter-trends").join("last_used.json")
    }

    /// Load persisted params; `Default` when the file is absent or unreadable.
    ///
    /// Values the command line would reject are dropped.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str::<Self>(&content)
            .unwrap_or_default()
            .sanitized()
    }

    fn sanitized(mut self) -> Self {
        if let Some(format) = self.format.take() {
            if REPORT_FORMATS.contains(&format.as_str()) {
                self.format = Some(format);
            } else {
                tracing::warn!("ignoring saved format {format:?}");
            }
        }
        self.rolling_window =
            keep_in_range("rolling_window", self.rolling_window, ROLLING_WINDOW_RANGE);
        self.peak_days = keep_in_range("peak_days", self.peak_days, PEAK_DAYS_RANGE);
        self
    }

    /// Write params via a temp file and rename, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear_at(path: &std::path::Path) -> std::io::Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, merge saved preferences and persist the
    /// result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::debug!("could not clear {}: {e}", config_path.display());
            }
            return settings.apply_debug();
        }

        // Anything given on the command line wins over the saved value.
        let last = LastUsedParams::load_from(config_path);
        if !is_arg_explicitly_set(&matches, "format") {
            if let Some(v) = last.format {
                settings.format = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "rolling_window") {
            if let Some(v) = last.rolling_window {
                settings.rolling_window = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "peak_days") {
            if let Some(v) = last.peak_days {
                settings.peak_days = v;
            }
        }

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::debug!("could not persist {}: {e}", config_path.display());
        }

        settings.apply_debug()
    }

    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// The `--from`/`--to` bounds, rejecting an inverted range.
    pub fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(MeterError::Config(format!(
                    "--from {from} is after --to {to}"
                )));
            }
        }
        Ok((self.from, self.to))
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            format: Some(s.format.clone()),
            rolling_window: Some(s.rolling_window),
            peak_days: Some(s.peak_days),
        }
    }
}

fn keep_in_range(name: &str, value: Option<u32>, range: RangeInclusive<i64>) -> Option<u32> {
    match value {
        Some(v) if !range.contains(&i64::from(v)) => {
            tracing::warn!(
                "ignoring saved {name} {v}: outside {}..={}",
                range.start(),
                range.end()
            );
            None
        }
        other => other,
    }
}

/// `true` when `name` (the field name, not the flag spelling) came from the
/// command line rather than a default.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
