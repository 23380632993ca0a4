//! Region CSV reader.
//!
//! The CSV export holds one region per row. Row 0 is a header and is
//! discarded; columns 5 and 6 hold the region centroid (X, Y) in
//! micrometers. Other columns are ignored, and rows may have differing
//! lengths: short rows are kept and soft-fail later, during extraction.
//! Empty lines are not records, but a row of empty fields (`,,,`) is data
//! and keeps its position.
//!
//! Only comma-separated files are supported.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::model::{CsvRow, Region};
use crate::error::MicroBridgeError;

const MIN_DATA_ROWS: usize = 3;

/// Read the data rows of a region CSV as regions, in row order.
///
/// # Errors
/// Fails when the file cannot be read, is not valid CSV/UTF-8, or holds
/// fewer than three data rows after the header.
pub fn read_region_csv(path: &Path) -> Result<Vec<Region<CsvRow>>, MicroBridgeError> {
    let file = File::open(path).map_err(|source| MicroBridgeError::from_io(path, "reading", source))?;
    parse_region_csv(BufReader::new(file), path)
}

/// Reads regions from a CSV string.
///
/// Useful for testing without file I/O.
pub fn from_region_csv_str(csv_str: &str) -> Result<Vec<Region<CsvRow>>, MicroBridgeError> {
    from_region_csv_slice(csv_str.as_bytes())
}

/// Reads regions from CSV bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_region_csv_slice(bytes: &[u8]) -> Result<Vec<Region<CsvRow>>, MicroBridgeError> {
    parse_region_csv(bytes, Path::new("<bytes>"))
}

pub(crate) fn parse_region_csv<R: Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<Region<CsvRow>>, MicroBridgeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|source| MicroBridgeError::MalformedCsv {
            path: path.to_path_buf(),
            source,
        })?;

        rows.push(CsvRow {
            line: record.position().map(|pos| pos.line()).unwrap_or_default(),
            fields: record.iter().map(str::to_owned).collect(),
        });
    }

    // Drop the header row.
    let data_rows: Vec<CsvRow> = rows.into_iter().skip(1).collect();
    if data_rows.len() < MIN_DATA_ROWS {
        return Err(MicroBridgeError::InsufficientRows {
            path: path.to_path_buf(),
            found: data_rows.len(),
        });
    }

    Ok(data_rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| Region::new(index, None, row))
        .collect())
}
