//! Required column layout of a meter export.
//!
//! Column lookup by name happens exactly once, in [`ColumnMap::resolve`];
//! everything downstream works with [`MeterReading`] values.

use chrono::NaiveDate;

use crate::dates::parse_meter_date;
use crate::error::{MeterError, Result};
use crate::models::RawRecord;
use crate::units::{ccf_to_gallons, is_source_unit, parse_quantity, SOURCE_UNIT};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// The four columns every meter export must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    AccessCode,
    TimeInterval,
    Consumption,
    Units,
}

impl Column {
    /// Required columns in display order.
    pub const REQUIRED: [Column; 4] = [
        Column::AccessCode,
        Column::TimeInterval,
        Column::Consumption,
        Column::Units,
    ];

    /// Exact header text, matched case-sensitively after cleaning.
    pub fn header(self) -> &'static str {
        match self {
            Column::AccessCode => "Access Code",
            Column::TimeInterval => "Time Interval",
            Column::Consumption => "Consumption",
            Column::Units => "Units",
        }
    }
}

/// Clean a header cell for comparison.
///
/// A leading byte-order mark is stripped from the first header only
/// (`position == 0`), then surrounding whitespace is trimmed.
pub fn clean_header(position: usize, raw: &str) -> &str {
    let name = if position == 0 {
        raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw)
    } else {
        raw
    };
    name.trim()
}

/// Required columns that do not appear in `headers`, in display order.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<Column> {
    let cleaned: Vec<&str> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| clean_header(i, h.as_ref()))
        .collect();
    Column::REQUIRED
        .into_iter()
        .filter(|col| !cleaned.contains(&col.header()))
        .collect()
}

// ── ColumnMap ─────────────────────────────────────────────────────────────────

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    access_code: usize,
    time_interval: usize,
    consumption: usize,
    units: usize,
}

impl ColumnMap {
    /// Locate every required column in `headers`.
    ///
    /// When a name appears more than once the first occurrence wins.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        let missing = missing_columns(headers);
        if !missing.is_empty() {
            return Err(MeterError::MissingColumns {
                required: Column::REQUIRED
                    .iter()
                    .map(|c| c.header().to_string())
                    .collect(),
                missing: missing.iter().map(|c| c.header().to_string()).collect(),
            });
        }

        let position = |col: Column| {
            headers
                .iter()
                .enumerate()
                .position(|(i, h)| clean_header(i, h.as_ref()) == col.header())
                .unwrap_or_default()
        };

        Ok(Self {
            access_code: position(Column::AccessCode),
            time_interval: position(Column::TimeInterval),
            consumption: position(Column::Consumption),
            units: position(Column::Units),
        })
    }

    /// Index of `column` in the header row.
    pub fn index(&self, column: Column) -> usize {
        match column {
            Column::AccessCode => self.access_code,
            Column::TimeInterval => self.time_interval,
            Column::Consumption => self.consumption,
            Column::Units => self.units,
        }
    }

    /// Project a raw row onto the required columns.
    ///
    /// Cells missing from a short row read as empty.
    pub fn reading<'a>(&self, record: &'a RawRecord) -> MeterReading<'a> {
        MeterReading {
            line: record.line,
            access_code: record.field(self.access_code),
            date: record.field(self.time_interval),
            quantity: record.field(self.consumption),
            unit: record.field(self.units),
        }
    }
}

/// One row of a meter export, reduced to the required cells.
///
/// Cells are borrowed untouched from the [`RawRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterReading<'a> {
    /// 1-based line in the source file.
    pub line: u64,
    pub access_code: &'a str,
    pub date: &'a str,
    pub quantity: &'a str,
    pub unit: &'a str,
}

impl MeterReading<'_> {
    /// `true` when the date or quantity cell is blank.
    pub fn is_missing_data(&self) -> bool {
        self.date.trim().is_empty() || self.quantity.trim().is_empty()
    }

    pub fn parse_date(&self) -> Result<NaiveDate> {
        parse_meter_date(self.date).ok_or_else(|| MeterError::InvalidDate {
            column: Column::TimeInterval.header().to_string(),
            line: self.line,
            value: self.date.to_string(),
        })
    }

    /// Parse the quantity cell as a finite number (sign not checked).
    pub fn parse_quantity(&self) -> Result<f64> {
        parse_quantity(self.quantity).ok_or_else(|| MeterError::NonNumeric {
            column: Column::Consumption.header().to_string(),
            line: self.line,
            value: self.quantity.to_string(),
        })
    }

    /// Reject a parsed quantity below zero.
    pub fn check_non_negative(&self, quantity: f64) -> Result<()> {
        if quantity < 0.0 {
            return Err(MeterError::NegativeQuantity {
                column: Column::Consumption.header().to_string(),
                line: self.line,
                value: self.quantity.to_string(),
            });
        }
        Ok(())
    }

    /// Convert a parsed quantity to gallons, rejecting results that overflow.
    pub fn to_gallons(&self, quantity: f64) -> Result<f64> {
        let gallons = ccf_to_gallons(quantity);
        if !gallons.is_finite() {
            return Err(MeterError::QuantityOutOfRange {
                column: Column::Consumption.header().to_string(),
                line: self.line,
                value: self.quantity.to_string(),
            });
        }
        Ok(gallons)
    }

    /// Fail on any non-blank date or quantity cell that does not parse.
    ///
    /// Used on rows about to be dropped for missing data, so only the blank
    /// cell itself is excused.
    pub fn check_present_cells(&self) -> Result<()> {
        if !self.date.trim().is_empty() {
            self.parse_date()?;
        }
        if !self.quantity.trim().is_empty() {
            self.parse_quantity()?;
        }
        Ok(())
    }

    pub fn check_unit(&self) -> Result<()> {
        if is_source_unit(self.unit) {
            return Ok(());
        }
        Err(MeterError::UnitMismatch {
            expected: SOURCE_UNIT.to_string(),
            line: self.line,
            value: self.unit.to_string(),
        })
    }
}
