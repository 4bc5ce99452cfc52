//! Table readers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use fishpass_core::{
    BarrierRecord, DataError, OriginRecord, ReachId, ReachRecord, WatershedMembership,
};

use crate::columns::{BarrierColumns, OriginColumns, ReachColumns, WatershedColumns};
use crate::error::TableError;

/// Open a table file for reading.
///
/// # Errors
///
/// [`TableError::Open`] if the file cannot be opened.
pub fn open(path: impl AsRef<Path>) -> Result<BufReader<File>, TableError> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })
}

// ── Header resolution ──────────────────────────────────────────────

struct Table<R> {
    name: &'static str,
    headers: StringRecord,
    reader: csv::Reader<R>,
}

impl<R: Read> Table<R> {
    fn new(name: &'static str, input: R) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(input);
        let headers = reader.headers()?.clone();
        Ok(Self {
            name,
            headers,
            reader,
        })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column))
    }

    fn required(&self, column: &str) -> Result<usize, DataError> {
        self.optional(column).ok_or_else(|| DataError::MissingColumn {
            table: self.name,
            column: column.to_owned(),
        })
    }

    /// Visit every data row with its 1-based row number.
    fn rows(
        &mut self,
        mut visit: impl FnMut(Row<'_>) -> Result<(), DataError>,
    ) -> Result<(), TableError> {
        let mut record = StringRecord::new();
        let mut number = 0;
        while self.reader.read_record(&mut record)? {
            number += 1;
            visit(Row {
                table: self.name,
                headers: &self.headers,
                number,
                record: &record,
            })?;
        }
        tracing::debug!(table = self.name, rows = number, "table read");
        Ok(())
    }
}

struct Row<'a> {
    table: &'static str,
    headers: &'a StringRecord,
    number: usize,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn cell(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or("")
    }

    fn invalid(&self, index: usize) -> DataError {
        DataError::InvalidValue {
            table: self.table,
            row: self.number,
            column: self.headers.get(index).unwrap_or_default().to_owned(),
            value: self.cell(index).to_owned(),
        }
    }

    /// A non-blank text cell.
    fn id(&self, index: usize) -> Result<&'a str, DataError> {
        match self.cell(index) {
            "" => Err(self.invalid(index)),
            s => Ok(s),
        }
    }

    /// A text cell, `None` when blank.
    fn optional_id(&self, index: usize) -> Option<&'a str> {
        Some(self.cell(index)).filter(|s| !s.is_empty())
    }

    fn number(&self, index: usize) -> Result<f64, DataError> {
        self.cell(index).parse().map_err(|_| self.invalid(index))
    }

    /// A numeric cell, `None` when blank.
    fn optional_number(&self, index: usize) -> Result<Option<f64>, DataError> {
        match self.cell(index) {
            "" => Ok(None),
            _ => self.number(index).map(Some),
        }
    }

    /// A numeric cell, `None` when blank or not a number.
    fn numeric(&self, index: usize) -> Option<f64> {
        self.cell(index).parse().ok()
    }
}

// ── Readers ────────────────────────────────────────────────────────

/// Read the reach table.
///
/// Columns other than the three mapped ones become numeric attributes.
/// Blank and non-numeric cells are left out of the record, so text
/// columns such as stream names are carried through harmlessly. The
/// `split_attribute` column, when mapped, is strict.
///
/// # Errors
///
/// [`DataError::MissingColumn`] for a missing `reach_id` or
/// `downstream_id` column, [`DataError::InvalidValue`] for a blank reach
/// id or a non-numeric split attribute, or a CSV error.
pub fn read_reaches(
    input: impl Read,
    columns: &ReachColumns,
) -> Result<Vec<ReachRecord>, TableError> {
    let mut table = Table::new("reaches", input)?;
    let id = table.required(&columns.reach_id)?;
    let down = table.required(&columns.downstream_id)?;
    let watershed = table.optional(&columns.watershed_id);
    let split = columns
        .split_attribute
        .as_deref()
        .and_then(|c| table.optional(c));
    let attributes: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != id && i != down && Some(i) != watershed)
        .map(|(i, h)| (i, h.to_owned()))
        .collect();

    let mut out = Vec::new();
    table.rows(|row| {
        let mut record = ReachRecord::new(row.id(id)?, row.optional_id(down));
        record.watershed_id = watershed.and_then(|w| row.optional_id(w)).map(Into::into);
        for (index, name) in &attributes {
            let value = if Some(*index) == split {
                row.optional_number(*index)?
            } else {
                row.numeric(*index)
            };
            if let Some(value) = value {
                record.attributes.insert(name.clone(), value);
            }
        }
        out.push(record);
        Ok(())
    })?;
    Ok(out)
}

/// Read the barrier table. A blank `passage_efficiency` cell (or a
/// missing column) leaves the efficiency unset.
///
/// # Errors
///
/// Missing required columns, blank ids, non-numeric values, or a CSV
/// error.
pub fn read_barriers(
    input: impl Read,
    columns: &BarrierColumns,
) -> Result<Vec<BarrierRecord>, TableError> {
    let mut table = Table::new("barriers", input)?;
    let id = table.required(&columns.barrier_id)?;
    let reach = table.required(&columns.reach_id)?;
    let position = table.required(&columns.position)?;
    let efficiency = table.optional(&columns.passage_efficiency);

    let mut out = Vec::new();
    table.rows(|row| {
        out.push(BarrierRecord {
            barrier_id: row.id(id)?.into(),
            reach_id: row.id(reach)?.into(),
            position: row.number(position)?,
            passage_efficiency: match efficiency {
                Some(e) => row.optional_number(e)?,
                None => None,
            },
        });
        Ok(())
    })?;
    Ok(out)
}

/// Read the origin table.
///
/// # Errors
///
/// Missing columns, blank ids, a non-numeric population, or a CSV error.
/// Range checks on the population happen when the run resolves origins.
pub fn read_origins(
    input: impl Read,
    columns: &OriginColumns,
) -> Result<Vec<OriginRecord>, TableError> {
    let mut table = Table::new("origins", input)?;
    let id = table.required(&columns.origin_id)?;
    let reach = table.required(&columns.reach_id)?;
    let population = table.required(&columns.initial_population)?;

    let mut out = Vec::new();
    table.rows(|row| {
        out.push(OriginRecord::new(
            row.id(id)?,
            row.id(reach)?,
            row.number(population)?,
        ));
        Ok(())
    })?;
    Ok(out)
}

/// Read the watershed membership table.
///
/// # Errors
///
/// Missing columns, blank ids, or a CSV error.
pub fn read_watersheds(
    input: impl Read,
    columns: &WatershedColumns,
) -> Result<Vec<WatershedMembership>, TableError> {
    let mut table = Table::new("watersheds", input)?;
    let watershed = table.required(&columns.watershed_id)?;
    let reach = table.required(&columns.reach_id)?;

    let mut out = Vec::new();
    table.rows(|row| {
        out.push(WatershedMembership::new(row.id(watershed)?, row.id(reach)?));
        Ok(())
    })?;
    Ok(out)
}

/// Read a main-stem list: one reach id per row in `column`.
///
/// # Errors
///
/// A missing column, a blank id, or a CSV error.
pub fn read_main_stems(input: impl Read, column: &str) -> Result<Vec<ReachId>, TableError> {
    let mut table = Table::new("main_stems", input)?;
    let reach = table.required(column)?;

    let mut out = Vec::new();
    table.rows(|row| {
        out.push(row.id(reach)?.into());
        Ok(())
    })?;
    Ok(out)
}
