//! CSV window import
//!
//! Expected header: `timestamp,rpm,engine_load,throttle_pos,long_fuel_trim_1,coolant_temp,elm_voltage`.
//! Timestamps are RFC 3339; empty cells are missing values. Columns may
//! appear in any order and absent channel columns read as missing.

use crate::source::StaticWindow;
use crate::SourceError;
use std::io::Read;
use std::path::Path;
use telemetry::SampleRow;
use tracing::debug;

/// Parse rows from any reader
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<SampleRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize::<SampleRow>() {
        rows.push(result?);
    }

    debug!("Parsed {} rows from CSV", rows.len());
    Ok(rows)
}

/// Parse a CSV file into a static window
pub fn window_from_path(path: impl AsRef<Path>) -> Result<StaticWindow, SourceError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| SourceError::Csv(csv::Error::from(e)))?;
    Ok(StaticWindow::new(read_rows(file)?))
}

/// Parse an in-memory CSV body into a static window
pub fn window_from_bytes(body: &[u8]) -> Result<StaticWindow, SourceError> {
    Ok(StaticWindow::new(read_rows(body)?))
}
