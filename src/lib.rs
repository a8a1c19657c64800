//! `sheet-tables` turns the output of a forward-only spreadsheet reader into in-memory
//! [`types::Table`]s and [`types::Dataset`]s.
//!
//! Extraction is driven by two policy bundles:
//!
//! - [`config::TableConfig`]: header handling, column naming, row copying and column type
//!   detection for one table
//! - [`config::DatasetConfig`]: which tables to extract and which `TableConfig` each one uses
//!
//! Every decision point is a named [`config::Policy`] with a documented default, so callers only
//! override what they need.
//!
//! ## What you can read
//!
//! - **In memory**: [`reader::MemoryCursor`]
//! - **CSV**: [`reader::CsvCursor`] (`.csv`)
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! ## Quick example: one table
//!
//! ```rust
//! use sheet_tables::extraction::extract_table;
//! use sheet_tables::reader::{MemoryCursor, SheetCursor};
//! use sheet_tables::types::{DataType, Value};
//!
//! # fn main() -> Result<(), sheet_tables::ExtractionError> {
//! let mut cursor = MemoryCursor::single(
//!     "people",
//!     vec![
//!         vec![Value::Utf8("name".into()), Value::Utf8("age".into())],
//!         vec![Value::Utf8("Ada".into()), Value::Int64(36)],
//!         vec![Value::Utf8("Grace".into()), Value::Null],
//!     ],
//! );
//! cursor.next_table()?;
//!
//! let table = extract_table(&mut cursor, None)?;
//! assert_eq!(table.column_names(), vec!["name", "age"]);
//! assert_eq!(table.schema().fields[1].data_type, DataType::Int64);
//! assert_eq!(table.get(1, "age"), Some(&Value::Null));
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick example: every sheet of a file
//!
//! ```no_run
//! use sheet_tables::extraction::{SourceOptions, extract_dataset_from_path};
//!
//! # fn main() -> Result<(), sheet_tables::ExtractionError> {
//! let ds = extract_dataset_from_path("report.xlsx", &SourceOptions::default())?;
//! for table in &ds.tables {
//!     println!("{}: {} rows", table.name, table.row_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`reader`]: the [`reader::SheetCursor`] contract and its implementations
//! - [`config`]: table and dataset policies
//! - [`extraction`]: the pipeline, path-based entry points and observers
//! - [`types`]: output tables, values and their conversions
//! - [`error`]: error type shared across the crate

pub mod config;
pub mod error;
pub mod extraction;
pub mod reader;
pub mod types;

pub use error::{ExtractionError, ExtractionResult};
