//! Result and failure table writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fishpass_core::{OriginFailure, PropagationResult};

use crate::error::TableError;

/// Create (or truncate) a table file for writing.
///
/// # Errors
///
/// [`TableError::Open`] if the file cannot be created.
pub fn create(path: impl AsRef<Path>) -> Result<BufWriter<File>, TableError> {
    let path = path.as_ref();
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the result table: `origin_id,reach_id,population,stop_reason`.
///
/// A header row is written even when `rows` is empty.
///
/// # Errors
///
/// A CSV or I/O error.
pub fn write_results(output: impl Write, rows: &[PropagationResult]) -> Result<(), TableError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record(["origin_id", "reach_id", "population", "stop_reason"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the failure table: `origin_id,error`.
///
/// # Errors
///
/// A CSV or I/O error.
pub fn write_failures(output: impl Write, failures: &[OriginFailure]) -> Result<(), TableError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record(["origin_id", "error"])?;
    for failure in failures {
        writer.serialize(failure)?;
    }
    writer.flush()?;
    Ok(())
}
