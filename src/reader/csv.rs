//! CSV cursor.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::Value;

use super::SheetCursor;

/// [`SheetCursor`] over a single CSV document, exposed as one table.
///
/// Rules:
///
/// - Every record is a row; header handling is left to the extraction config.
/// - The field count is the width of the first record (zero for an empty document).
/// - Empty (or whitespace-only) fields are null; everything else is read as [`Value::Utf8`].
pub struct CsvCursor<R> {
    reader: csv::Reader<R>,
    name: String,
    state: State,
    field_count: usize,
    pending: Option<csv::StringRecord>,
    record: csv::StringRecord,
    on_row: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeTable,
    InTable,
    Done,
}

impl CsvCursor<File> {
    /// Open a CSV file; the table is named after the file stem.
    pub fn from_path(path: impl AsRef<Path>) -> ExtractionResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv")
            .to_string();
        let reader = builder().from_path(path)?;
        Ok(Self::from_reader(reader, name))
    }
}

impl<R: Read> CsvCursor<R> {
    /// Wrap an existing CSV reader.
    ///
    /// The reader should be built with `has_headers(false)` so the first record reaches the
    /// header policies, and `flexible(true)` so ragged records are accepted.
    pub fn from_reader(reader: csv::Reader<R>, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            state: State::BeforeTable,
            field_count: 0,
            pending: None,
            record: csv::StringRecord::new(),
            on_row: false,
        }
    }

    /// Read CSV from any `Read` source with the default reader settings.
    pub fn from_read(rdr: R, name: impl Into<String>) -> Self {
        Self::from_reader(builder().from_reader(rdr), name)
    }
}

fn builder() -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(false).flexible(true);
    b
}

impl<R: Read> SheetCursor for CsvCursor<R> {
    fn next_table(&mut self) -> ExtractionResult<bool> {
        self.on_row = false;
        match self.state {
            State::BeforeTable => {
                // The first record fixes the field count, so read it ahead.
                let mut first = csv::StringRecord::new();
                if self.reader.read_record(&mut first)? {
                    self.field_count = first.len();
                    self.pending = Some(first);
                }
                self.state = State::InTable;
                Ok(true)
            }
            State::InTable | State::Done => {
                self.state = State::Done;
                self.pending = None;
                self.field_count = 0;
                Ok(false)
            }
        }
    }

    fn next_row(&mut self) -> ExtractionResult<bool> {
        if self.state != State::InTable {
            return Ok(false);
        }
        if let Some(first) = self.pending.take() {
            self.record = first;
            self.on_row = true;
        } else {
            self.on_row = self.reader.read_record(&mut self.record)?;
        }
        Ok(self.on_row)
    }

    fn has_current_row(&self) -> bool {
        self.on_row
    }

    fn field_count(&self) -> usize {
        self.field_count
    }

    fn is_null(&self, index: usize) -> bool {
        if !self.on_row || index >= self.field_count {
            return true;
        }
        self.record.get(index).is_none_or(|raw| raw.trim().is_empty())
    }

    fn value(&self, index: usize) -> ExtractionResult<Value> {
        if index >= self.field_count {
            return Err(ExtractionError::FieldOutOfRange {
                index,
                field_count: self.field_count,
            });
        }
        if !self.on_row {
            return Err(ExtractionError::NoCurrentRow);
        }
        if self.is_null(index) {
            return Ok(Value::Null);
        }
        Ok(self
            .record
            .get(index)
            .map(|raw| Value::Utf8(raw.to_string()))
            .unwrap_or(Value::Null))
    }

    fn table_name(&self) -> Option<&str> {
        match self.state {
            State::InTable => Some(self.name.as_str()),
            State::BeforeTable | State::Done => None,
        }
    }
}
