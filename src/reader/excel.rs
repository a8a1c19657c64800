#![cfg(feature = "excel")]

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::{DataType, Value};

use super::SheetCursor;

/// [`SheetCursor`] over the sheets of an Excel document (`.xlsx`, `.xls`, `.xlsb`, `.ods`, etc.).
///
/// Behavior:
/// - One table per sheet, in workbook order (or in the order given to [`WorkbookCursor::open_sheets`])
/// - A sheet is decoded when the cursor advances onto it
/// - Cells are addressed from `A1`, so leading blank rows and columns are kept as null fields
/// - The field count is the index of the last used column plus one (zero for an empty sheet)
/// - Date-formatted cells read as [`Value::DateTime`]; durations keep their serial number
pub struct WorkbookCursor {
    workbook: Sheets<BufReader<File>>,
    sheets: Vec<String>,
    next_sheet: usize,
    current: Option<LoadedSheet>,
}

struct LoadedSheet {
    name: String,
    range: Range<Data>,
    width: usize,
    height: usize,
    next_row: usize,
    row: Option<usize>,
}

impl WorkbookCursor {
    /// Open a workbook and visit all of its sheets.
    pub fn open(path: impl AsRef<Path>) -> ExtractionResult<Self> {
        Self::open_sheets(path, None)
    }

    /// Open a workbook and visit only `sheet_names` (in the provided order), or all sheets
    /// when `None`.
    pub fn open_sheets(path: impl AsRef<Path>, sheet_names: Option<&[&str]>) -> ExtractionResult<Self> {
        let workbook = open_workbook_auto(path)?;
        let sheets: Vec<String> = match sheet_names {
            Some(names) => names.iter().map(|s| s.to_string()).collect(),
            None => workbook.sheet_names().to_vec(),
        };
        Ok(Self {
            workbook,
            sheets,
            next_sheet: 0,
            current: None,
        })
    }

    /// Sheet names this cursor will visit.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheets
    }

    fn cell(&self, index: usize) -> Option<&Data> {
        let sheet = self.current.as_ref()?;
        let row = sheet.row?;
        if index >= sheet.width {
            return None;
        }
        sheet.range.get_value((row as u32, index as u32))
    }
}

impl SheetCursor for WorkbookCursor {
    fn next_table(&mut self) -> ExtractionResult<bool> {
        self.current = None;
        let Some(name) = self.sheets.get(self.next_sheet).cloned() else {
            return Ok(false);
        };
        self.next_sheet += 1;

        let range = self.workbook.worksheet_range(&name)?;
        let (height, width) = match range.end() {
            Some((r, c)) if !range.is_empty() => (r as usize + 1, c as usize + 1),
            _ => (0, 0),
        };
        self.current = Some(LoadedSheet {
            name,
            range,
            width,
            height,
            next_row: 0,
            row: None,
        });
        Ok(true)
    }

    fn next_row(&mut self) -> ExtractionResult<bool> {
        let Some(sheet) = self.current.as_mut() else {
            return Ok(false);
        };
        if sheet.next_row < sheet.height {
            sheet.row = Some(sheet.next_row);
            sheet.next_row += 1;
            Ok(true)
        } else {
            sheet.row = None;
            Ok(false)
        }
    }

    fn has_current_row(&self) -> bool {
        self.current.as_ref().is_some_and(|s| s.row.is_some())
    }

    fn field_count(&self) -> usize {
        self.current.as_ref().map(|s| s.width).unwrap_or(0)
    }

    fn is_null(&self, index: usize) -> bool {
        self.cell(index).is_none_or(|c| matches!(c, Data::Empty))
    }

    fn value(&self, index: usize) -> ExtractionResult<Value> {
        let field_count = self.field_count();
        if index >= field_count {
            return Err(ExtractionError::FieldOutOfRange { index, field_count });
        }
        if !self.has_current_row() {
            return Err(ExtractionError::NoCurrentRow);
        }
        Ok(self.cell(index).map(cell_to_value).unwrap_or(Value::Null))
    }

    fn text(&self, index: usize) -> ExtractionResult<Option<String>> {
        Ok(self.cell(index).and_then(cell_to_text))
    }

    fn table_name(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.name.as_str())
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Float64(dt.as_f64())),
        Data::DateTimeIso(s) => Value::Utf8(s.clone())
            .coerce(DataType::DateTime)
            .unwrap_or_else(|_| Value::Utf8(s.clone())),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(format!("{e:?}")),
    }
}

fn cell_to_text(c: &Data) -> Option<String> {
    match c {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(cell_to_value(c).to_string()),
        Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(format!("{e:?}")),
    }
}
