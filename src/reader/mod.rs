//! Forward-only cursors over spreadsheet-like sources.
//!
//! The extraction pipeline only ever talks to a [`SheetCursor`]. Implementations:
//!
//! - [`memory::MemoryCursor`]: pre-decoded tables held in memory
//! - [`csv::CsvCursor`]: a single CSV document
//! - `excel::WorkbookCursor` (feature `excel`): every sheet of an Excel/ODS workbook

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod memory;

use crate::error::ExtractionResult;
use crate::types::Value;

pub use self::csv::CsvCursor;
#[cfg(feature = "excel")]
pub use self::excel::WorkbookCursor;
pub use self::memory::{MemoryCursor, MemoryTable};

/// Forward-only traversal over a sequence of tables, their rows and fields.
///
/// A new cursor sits *before* its first table: call [`SheetCursor::next_table`] to position it.
/// After `next_table` the cursor sits before the table's first row.
///
/// The field count is fixed per table and may be zero, meaning there is no usable table at this
/// position. A cursor is stateful; it must only be driven by one extraction at a time.
pub trait SheetCursor {
    /// Move to the next table. Returns `false` once all tables are consumed.
    fn next_table(&mut self) -> ExtractionResult<bool>;

    /// Move to the next row of the current table. Returns `false` at the end of the table.
    fn next_row(&mut self) -> ExtractionResult<bool>;

    /// `true` while the cursor is positioned on a row.
    fn has_current_row(&self) -> bool;

    /// Number of fields per row in the current table.
    fn field_count(&self) -> usize;

    /// `true` if the field is absent. Also `true` without a current row or past the field count.
    fn is_null(&self, index: usize) -> bool;

    /// Native value of a field in the current row.
    fn value(&self, index: usize) -> ExtractionResult<Value>;

    /// Field rendered as text, `None` when the field is null.
    fn text(&self, index: usize) -> ExtractionResult<Option<String>> {
        if self.is_null(index) {
            return Ok(None);
        }
        Ok(Some(self.value(index)?.to_string()))
    }

    /// Name of the current table, `None` when not positioned on a table.
    fn table_name(&self) -> Option<&str>;
}

/// `true` if any field of the current row is non-null.
pub fn has_non_null_field(cursor: &dyn SheetCursor) -> bool {
    (0..cursor.field_count()).any(|idx| !cursor.is_null(idx))
}
