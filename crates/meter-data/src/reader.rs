//! CSV decoding for meter exports.
//!
//! Cells are kept exactly as written; trimming and interpretation belong to
//! the validator and normalizer.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use meter_core::error::{MeterError, Result};
use meter_core::models::{RawRecord, RawTable};
use tracing::debug;

// ── Public API ────────────────────────────────────────────────────────────────

/// Read the CSV at `path` into a [`RawTable`].
pub fn read_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| MeterError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table_from(file)?;

    debug!(
        "Read {} rows with {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );

    Ok(table)
}

/// Decode CSV text from any reader into a [`RawTable`].
///
/// The first row is the header. Rows may be shorter or longer than the
/// header; blank lines are skipped by the CSV decoder.
pub fn read_table_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        records.push(RawRecord::new(line, record.iter().collect::<Vec<_>>()));
    }

    Ok(RawTable::new(headers, records))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
