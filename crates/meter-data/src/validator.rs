//! Structural and semantic checks on a raw meter export.
//!
//! Checks run in a fixed order and stop at the first failure:
//! schema, date format, numeric quantity, quantity range, unit.

use meter_core::error::Result;
use meter_core::models::{RawTable, ValidationResult};
use meter_core::schema::{ColumnMap, MeterReading};
use tracing::debug;

/// Validate `table` without consuming or altering it.
///
/// Never fails; problems come back as [`ValidationResult::Invalid`].
pub fn validate(table: &RawTable) -> ValidationResult {
    match run_checks(table) {
        Ok(()) => ValidationResult::Valid,
        Err(err) => {
            debug!("Validation failed ({}): {}", err.kind(), err);
            ValidationResult::Invalid(err)
        }
    }
}

fn run_checks(table: &RawTable) -> Result<()> {
    let columns = ColumnMap::resolve(&table.headers)?;
    let readings: Vec<MeterReading<'_>> = table.records.iter().map(|r| columns.reading(r)).collect();

    for reading in &readings {
        reading.parse_date()?;
    }

    let mut quantities = Vec::with_capacity(readings.len());
    for reading in &readings {
        quantities.push(reading.parse_quantity()?);
    }

    for (reading, &quantity) in readings.iter().zip(&quantities) {
        reading.check_non_negative(quantity)?;
        reading.to_gallons(quantity)?;
    }

    for reading in &readings {
        reading.check_unit()?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
