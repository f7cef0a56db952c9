//! Two-column `date,usage` CSV form of a canonical series.
//!
//! Dates are written as `YYYY-MM-DD` and usage as the shortest decimal text
//! that reads back to the same `f64`, so a write/read round trip is exact.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use meter_core::error::{MeterError, Result};
use meter_core::models::{UsageRecord, UsageSeries};
use tracing::debug;

const HEADER: [&str; 2] = ["date", "usage"];

/// Write `series` as CSV to `writer`, header first.
pub fn write_series<W: Write>(series: &UsageSeries, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(HEADER)?;
    for record in series {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `series` to a CSV file at `path`, replacing any existing file.
pub fn write_series_file(series: &UsageSeries, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| MeterError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_series(series, file)?;
    debug!("Exported {} records to {}", series.len(), path.display());
    Ok(())
}

/// Read a `date,usage` CSV back into a series, sorted by date.
pub fn read_series<R: Read>(reader: R) -> Result<UsageSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = rdr
        .deserialize::<UsageRecord>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    records.sort_by_key(|r| r.date);
    Ok(UsageSeries::new(records))
}

/// Read a `date,usage` CSV file.
pub fn read_series_file(path: &Path) -> Result<UsageSeries> {
    let file = File::open(path).map_err(|source| MeterError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_series(file)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
