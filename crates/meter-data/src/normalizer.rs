//! Raw meter export → canonical usage series.
//!
//! The normalizer repeats the validator's per-cell checks rather than
//! trusting that validation ran. Rows with a blank date or quantity are
//! dropped without error, unless their other cell is malformed.

use meter_core::error::Result;
use meter_core::models::{RawTable, UsageRecord, UsageSeries};
use meter_core::schema::ColumnMap;
use tracing::debug;

/// A canonical series plus the number of rows dropped for missing data.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub series: UsageSeries,
    pub dropped_rows: usize,
}

/// Convert `table` into a date-sorted gallon series.
pub fn normalize(table: &RawTable) -> Result<UsageSeries> {
    normalize_with_report(table).map(|n| n.series)
}

/// Same as [`normalize`], also reporting how many rows were dropped.
///
/// For every kept row: the date must be `MM/DD/YYYY`, the quantity a
/// non-negative finite number and the unit CCF. The first violation aborts
/// the whole batch. Output is sorted by date; rows sharing a date keep
/// their input order and are not merged.
pub fn normalize_with_report(table: &RawTable) -> Result<Normalized> {
    let columns = ColumnMap::resolve(&table.headers)?;

    let mut records = Vec::with_capacity(table.len());
    let mut dropped_rows = 0usize;

    for raw in &table.records {
        let reading = columns.reading(raw);
        if reading.is_missing_data() {
            reading.check_present_cells()?;
            dropped_rows += 1;
            continue;
        }

        let date = reading.parse_date()?;
        let quantity = reading.parse_quantity()?;
        reading.check_non_negative(quantity)?;
        let usage = reading.to_gallons(quantity)?;
        reading.check_unit()?;

        records.push(UsageRecord::new(date, usage));
    }

    // Stable: equal dates stay in input order.
    records.sort_by_key(|r| r.date);

    debug!(
        "Normalized {} rows into {} records ({} dropped for missing data)",
        table.len(),
        records.len(),
        dropped_rows
    );

    Ok(Normalized {
        series: UsageSeries::new(records),
        dropped_rows,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
