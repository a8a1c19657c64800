//! Path-based entry points.
//!
//! [`extract_dataset_from_path`] opens the right [`SheetCursor`] for a file and runs
//! [`super::extract_dataset`] over it.
//!
//! - If [`SourceOptions::format`] is `None`, the format is inferred from the file extension.
//! - Excel/ODS sources need the `excel` feature.

use std::path::Path;

use crate::config::{DatasetConfig, Step, TableConfig};
use crate::error::{ExtractionError, ExtractionResult};
use crate::reader::{CsvCursor, SheetCursor};
use crate::types::{Dataset, Table};

use super::dataset::extract_dataset;
use super::observability::report_failure;
use super::table::{policy_stopped, run_table};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values (one table).
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "xla" | "xlam" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Which sheets of a workbook the cursor visits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// Every sheet in workbook order (default).
    #[default]
    All,
    /// Only the listed sheets, in the listed order.
    Sheets(Vec<String>),
}

/// Options for path-based extraction.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<SourceFormat>,
    /// Workbook sheet selection; ignored for CSV.
    pub sheets: SheetSelection,
    /// Dataset policy (its table selector is also used by [`extract_table_from_path`]).
    pub dataset: DatasetConfig,
}

/// Open a cursor for `path`, positioned before its first table.
///
/// # Examples
///
/// ```no_run
/// use sheet_tables::extraction::{SourceOptions, extract_dataset, open_cursor};
///
/// # fn main() -> Result<(), sheet_tables::ExtractionError> {
/// let options = SourceOptions::default();
/// let mut cursor = open_cursor("people.csv", &options)?;
/// let ds = extract_dataset(cursor.as_mut(), Some(&options.dataset))?;
/// println!("tables={}", ds.table_count());
/// # Ok(())
/// # }
/// ```
pub fn open_cursor(path: impl AsRef<Path>, options: &SourceOptions) -> ExtractionResult<Box<dyn SheetCursor>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    match format {
        SourceFormat::Csv => Ok(Box::new(CsvCursor::from_path(path)?)),
        SourceFormat::Excel => open_workbook_cursor(path, &options.sheets),
    }
}

/// Extract every selected table of the file at `path`.
///
/// Failures to open the source are reported to the dataset observer, like extraction failures.
pub fn extract_dataset_from_path(path: impl AsRef<Path>, options: &SourceOptions) -> ExtractionResult<Dataset> {
    let mut cursor = match open_cursor(path, options) {
        Ok(c) => c,
        Err(e) => {
            report_failure(options.dataset.observer(), &e);
            return Err(e);
        }
    };
    extract_dataset(cursor.as_mut(), Some(&options.dataset))
}

/// Extract the first table the dataset's table selector accepts.
///
/// Returns `Ok(None)` when the source has no such table, or when the selector fails and
/// `options.dataset.policy_errors_end_loop` is set. A table config without an observer inherits
/// the dataset's; open failures are reported to it like extraction failures.
pub fn extract_table_from_path(
    path: impl AsRef<Path>,
    options: &SourceOptions,
    config: Option<&TableConfig>,
) -> ExtractionResult<Option<Table>> {
    let mut table_config = config.cloned().unwrap_or_default();
    if table_config.observer().is_none() {
        table_config.set_observer(options.dataset.observer().cloned());
    }
    let result = first_table(path.as_ref(), options, &table_config);
    if let Err(e) = &result {
        report_failure(table_config.observer(), e);
    }
    result
}

fn first_table(path: &Path, options: &SourceOptions, config: &TableConfig) -> ExtractionResult<Option<Table>> {
    let dataset = &options.dataset;
    let table_select = dataset.table_select();
    let mut cursor = open_cursor(path, options)?;
    match (table_select.func())(cursor.as_mut(), dataset) {
        Ok(Step::Continue) => run_table(cursor.as_mut(), config).map(Some),
        Ok(Step::Stop) => {
            policy_stopped(config.observer(), table_select.name(), None);
            Ok(None)
        }
        Err(e) if dataset.policy_errors_end_loop => {
            policy_stopped(config.observer(), table_select.name(), Some(&e));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn infer_format_from_path(path: &Path) -> ExtractionResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ExtractionError::UnsupportedSource {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| ExtractionError::UnsupportedSource {
        message: format!("cannot infer format from extension '{ext}' for path ({})", path.display()),
    })
}

fn open_workbook_cursor(path: &Path, sheets: &SheetSelection) -> ExtractionResult<Box<dyn SheetCursor>> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheets);

    #[cfg(feature = "excel")]
    {
        use crate::reader::WorkbookCursor;

        let cursor = match sheets {
            SheetSelection::All => WorkbookCursor::open(path)?,
            SheetSelection::Sheets(names) => {
                let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
                WorkbookCursor::open_sheets(path, Some(refs.as_slice()))?
            }
        };
        Ok(Box::new(cursor))
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(ExtractionError::UnsupportedSource {
            message: "excel extraction not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SourceFormat, SourceOptions, extract_dataset_from_path};
    use crate::error::ExtractionError;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_extension("CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_extension("xlsx"), Some(SourceFormat::Excel));
        assert_eq!(SourceFormat::from_extension("ods"), Some(SourceFormat::Excel));
        assert_eq!(SourceFormat::from_extension("parquet"), None);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = extract_dataset_from_path("data.parquet", &SourceOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedSource { .. }));
        assert!(err.to_string().contains("'parquet'"));
    }
}
