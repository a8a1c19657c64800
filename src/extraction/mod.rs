//! Extraction pipeline.
//!
//! - [`extract_table`]: one [`crate::types::Table`] from the table the cursor is on
//! - [`extract_dataset`]: a [`crate::types::Dataset`] of every table the dataset policy selects
//! - [`extract_dataset_from_path`] / [`extract_table_from_path`]: open a CSV or workbook first
//!
//! Progress and failures are reported to the [`ExtractionObserver`] attached to the config.

pub mod dataset;
pub mod observability;
pub mod table;
pub mod unified;

pub use dataset::extract_dataset;
pub use observability::{
    CompositeObserver, ExtractionEvent, ExtractionObserver, ExtractionSeverity, FileObserver, StdErrObserver,
    severity_for_error,
};
pub use table::{extract_table, reconcile_column_types};
pub use unified::{
    SheetSelection, SourceFormat, SourceOptions, extract_dataset_from_path, extract_table_from_path, open_cursor,
};
