//! Extraction policy.
//!
//! [`TableConfig`] and [`DatasetConfig`] are value bundles: flags plus named [`Policy`] slots.
//! Every slot always holds a policy; resetting a slot (passing `None` to its setter) puts the
//! built-in default back.
//!
//! ## Example: custom row filter
//!
//! ```rust
//! use sheet_tables::config::{RowSelect, Step, TableConfig, default_row_select};
//! use sheet_tables::extraction::extract_table;
//! use sheet_tables::reader::{MemoryCursor, SheetCursor};
//! use sheet_tables::types::Value;
//!
//! # fn main() -> Result<(), sheet_tables::ExtractionError> {
//! let mut cursor = MemoryCursor::single(
//!     "orders",
//!     vec![
//!         vec![Value::Utf8("item".into()), Value::Utf8("qty".into())],
//!         vec![Value::Utf8("apple".into()), Value::Int64(3)],
//!         vec![Value::Utf8("TOTAL".into()), Value::Int64(3)],
//!     ],
//! );
//! cursor.next_table()?;
//!
//! // Stop at the totals line instead of importing it.
//! let config = TableConfig::default().with_row_select(RowSelect::new("stop_at_total", |cursor, config, row| {
//!     if cursor.text(0)?.as_deref() == Some("TOTAL") {
//!         return Ok(Step::Stop);
//!     }
//!     default_row_select(cursor, config, row)
//! }));
//!
//! let table = extract_table(&mut cursor, Some(&config))?;
//! assert_eq!(table.row_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod table;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub use dataset::{
    DatasetConfig, TableConfigSelect, TableConfigSelectFn, TableSelect, TableSelectFn, default_table_config_select,
    default_table_select,
};
pub use table::{
    ColumnNameFormat, ColumnTypeSelect, ColumnTypeSelectFn, HeaderRowSelect, HeaderRowSelectFn, HeaderSelect,
    HeaderSelectFn, RowSelect, RowSelectFn, TableConfig, default_column_type_select, default_header_row_select,
    default_header_select, default_row_select,
};

/// Outcome of a looping policy (row copy, table selection).
///
/// Together with `Err(_)` this gives the three outcomes the pipeline distinguishes: keep going,
/// stop normally, or abort with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep the current item and continue.
    Continue,
    /// End the loop normally; the current item is discarded.
    Stop,
}

/// A decision function with an explicit name.
///
/// The name is what observers print when describing the active configuration.
pub struct Policy<F: ?Sized> {
    name: Cow<'static, str>,
    func: Arc<F>,
}

impl<F: ?Sized> Policy<F> {
    /// Policy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn func(&self) -> &F {
        &self.func
    }

    pub(crate) fn from_arc(name: impl Into<Cow<'static, str>>, func: Arc<F>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F: ?Sized> Clone for Policy<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Policy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
