//! In-memory cursor.

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::Value;

use super::SheetCursor;

/// A named table of raw rows fed to a [`MemoryCursor`].
///
/// The first row fixes the table's field count. Shorter rows read as null past their end;
/// fields of longer rows past the field count are not visible.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable {
    /// Table name.
    pub name: String,
    /// Raw rows.
    pub rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    /// Create a table from rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// A table with no rows, hence a field count of zero.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// [`SheetCursor`] over tables already decoded into [`Value`]s.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    tables: Vec<MemoryTable>,
    next_table: usize,
    current: Option<Position>,
}

#[derive(Debug, Clone, Copy)]
struct Position {
    table: usize,
    width: usize,
    next_row: usize,
    row: Option<usize>,
}

impl MemoryCursor {
    /// Create a cursor positioned before the first table.
    pub fn new(tables: Vec<MemoryTable>) -> Self {
        Self {
            tables,
            next_table: 0,
            current: None,
        }
    }

    /// Convenience constructor for a single table.
    pub fn single(name: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        Self::new(vec![MemoryTable::new(name, rows)])
    }

    fn current_row(&self) -> Option<&[Value]> {
        let pos = self.current?;
        let row = pos.row?;
        self.tables[pos.table].rows.get(row).map(Vec::as_slice)
    }
}

impl SheetCursor for MemoryCursor {
    fn next_table(&mut self) -> ExtractionResult<bool> {
        if self.next_table >= self.tables.len() {
            self.current = None;
            return Ok(false);
        }
        let table = self.next_table;
        self.next_table += 1;
        self.current = Some(Position {
            table,
            width: self.tables[table].width(),
            next_row: 0,
            row: None,
        });
        Ok(true)
    }

    fn next_row(&mut self) -> ExtractionResult<bool> {
        let Some(pos) = self.current.as_mut() else {
            return Ok(false);
        };
        if pos.next_row < self.tables[pos.table].rows.len() {
            pos.row = Some(pos.next_row);
            pos.next_row += 1;
            Ok(true)
        } else {
            pos.row = None;
            Ok(false)
        }
    }

    fn has_current_row(&self) -> bool {
        self.current_row().is_some()
    }

    fn field_count(&self) -> usize {
        self.current.map(|p| p.width).unwrap_or(0)
    }

    fn is_null(&self, index: usize) -> bool {
        if index >= self.field_count() {
            return true;
        }
        self.current_row()
            .and_then(|row| row.get(index))
            .is_none_or(Value::is_null)
    }

    fn value(&self, index: usize) -> ExtractionResult<Value> {
        let field_count = self.field_count();
        if index >= field_count {
            return Err(ExtractionError::FieldOutOfRange { index, field_count });
        }
        let row = self.current_row().ok_or(ExtractionError::NoCurrentRow)?;
        Ok(row.get(index).cloned().unwrap_or(Value::Null))
    }

    fn table_name(&self) -> Option<&str> {
        self.current.map(|p| self.tables[p.table].name.as_str())
    }
}
