//! Per-table extraction policy and its defaults.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::ExtractionResult;
use crate::extraction::observability::ExtractionObserver;
use crate::reader::{SheetCursor, has_non_null_field};
use crate::types::{DataType, Table, Value};

use super::{Policy, Step};

/// Moves the cursor onto the header row.
pub type HeaderRowSelectFn = dyn Fn(&mut dyn SheetCursor, &TableConfig) -> ExtractionResult<()> + Send + Sync;
/// Produces the column names from the current (header) row.
pub type HeaderSelectFn = dyn Fn(&mut dyn SheetCursor, &TableConfig) -> ExtractionResult<Vec<String>> + Send + Sync;
/// Copies the current row into a destination row as wide as the table.
pub type RowSelectFn = dyn Fn(&mut dyn SheetCursor, &TableConfig, &mut [Value]) -> ExtractionResult<Step> + Send + Sync;
/// Resolves the type of column `index` of a table; `None` keeps the current type.
pub type ColumnTypeSelectFn = dyn Fn(&Table, usize, &TableConfig) -> Option<DataType> + Send + Sync;

pub type HeaderRowSelect = Policy<HeaderRowSelectFn>;
pub type HeaderSelect = Policy<HeaderSelectFn>;
pub type RowSelect = Policy<RowSelectFn>;
pub type ColumnTypeSelect = Policy<ColumnTypeSelectFn>;

impl Policy<HeaderRowSelectFn> {
    /// Wrap a header-row locator.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&mut dyn SheetCursor, &TableConfig) -> ExtractionResult<()> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(f))
    }
}

impl Policy<HeaderSelectFn> {
    /// Wrap a header extractor.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&mut dyn SheetCursor, &TableConfig) -> ExtractionResult<Vec<String>> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(f))
    }
}

impl Policy<RowSelectFn> {
    /// Wrap a row copier.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&mut dyn SheetCursor, &TableConfig, &mut [Value]) -> ExtractionResult<Step> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(f))
    }
}

impl Policy<ColumnTypeSelectFn> {
    /// Wrap a column-type resolver.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Table, usize, &TableConfig) -> Option<DataType> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(f))
    }
}

/// Format for synthesized column names. `{0}` is replaced with the column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNameFormat(String);

impl ColumnNameFormat {
    /// Placeholder replaced by the column index.
    pub const SLOT: &'static str = "{0}";
    /// Format used when none (or a blank one) is given.
    pub const DEFAULT: &'static str = "Column_{0}";

    /// Normalise a format: blank resets to [`Self::DEFAULT`], a missing slot is appended.
    pub fn new(format: impl Into<String>) -> Self {
        let mut format = format.into();
        if format.trim().is_empty() {
            return Self::default();
        }
        if !format.contains(Self::SLOT) {
            format.push_str(Self::SLOT);
        }
        Self(format)
    }

    /// Column name for `index`.
    pub fn apply(&self, index: usize) -> String {
        self.0.replace(Self::SLOT, &index.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ColumnNameFormat {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for ColumnNameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options controlling how one table is extracted.
///
/// Use [`Default`] for common cases: first non-empty row is the header, column types are
/// detected, blank headers become `Column_<index>`.
#[derive(Clone)]
pub struct TableConfig {
    /// Extract the header row as column names (default `true`).
    pub use_header_row: bool,
    /// Scan column data to pick column types (default `true`).
    pub detect_column_types: bool,
    /// Treat an `Err` from the row copier as the end of the table instead of failing
    /// (default `false`). Swallowed errors are still reported to the observer.
    pub policy_errors_end_loop: bool,
    column_name_format: ColumnNameFormat,
    header_row_select: HeaderRowSelect,
    header_select: HeaderSelect,
    row_select: RowSelect,
    column_type_select: ColumnTypeSelect,
    observer: Option<Arc<dyn ExtractionObserver>>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            use_header_row: true,
            detect_column_types: true,
            policy_errors_end_loop: false,
            column_name_format: ColumnNameFormat::default(),
            header_row_select: default_header_row_select_policy(),
            header_select: default_header_select_policy(),
            row_select: default_row_select_policy(),
            column_type_select: default_column_type_select_policy(),
            observer: None,
        }
    }
}

impl fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("use_header_row", &self.use_header_row)
            .field("detect_column_types", &self.detect_column_types)
            .field("policy_errors_end_loop", &self.policy_errors_end_loop)
            .field("column_name_format", &self.column_name_format.as_str())
            .field("header_row_select", &self.header_row_select)
            .field("header_select", &self.header_select)
            .field("row_select", &self.row_select)
            .field("column_type_select", &self.column_type_select)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl TableConfig {
    pub fn column_name_format(&self) -> &ColumnNameFormat {
        &self.column_name_format
    }

    /// Set the column name format; see [`ColumnNameFormat::new`] for normalisation.
    pub fn set_column_name_format(&mut self, format: impl Into<String>) {
        self.column_name_format = ColumnNameFormat::new(format);
    }

    pub fn header_row_select(&self) -> &HeaderRowSelect {
        &self.header_row_select
    }

    /// Replace the header-row locator; `None` restores [`default_header_row_select`].
    pub fn set_header_row_select(&mut self, policy: Option<HeaderRowSelect>) {
        self.header_row_select = policy.unwrap_or_else(default_header_row_select_policy);
    }

    pub fn header_select(&self) -> &HeaderSelect {
        &self.header_select
    }

    /// Replace the header extractor; `None` restores [`default_header_select`].
    pub fn set_header_select(&mut self, policy: Option<HeaderSelect>) {
        self.header_select = policy.unwrap_or_else(default_header_select_policy);
    }

    pub fn row_select(&self) -> &RowSelect {
        &self.row_select
    }

    /// Replace the row copier; `None` restores [`default_row_select`].
    pub fn set_row_select(&mut self, policy: Option<RowSelect>) {
        self.row_select = policy.unwrap_or_else(default_row_select_policy);
    }

    pub fn column_type_select(&self) -> &ColumnTypeSelect {
        &self.column_type_select
    }

    /// Replace the column-type resolver; `None` restores [`default_column_type_select`].
    pub fn set_column_type_select(&mut self, policy: Option<ColumnTypeSelect>) {
        self.column_type_select = policy.unwrap_or_else(default_column_type_select_policy);
    }

    pub fn observer(&self) -> Option<&Arc<dyn ExtractionObserver>> {
        self.observer.as_ref()
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn ExtractionObserver>>) {
        self.observer = observer;
    }

    pub fn with_use_header_row(mut self, use_header_row: bool) -> Self {
        self.use_header_row = use_header_row;
        self
    }

    pub fn with_detect_column_types(mut self, detect: bool) -> Self {
        self.detect_column_types = detect;
        self
    }

    pub fn with_policy_errors_end_loop(mut self, enabled: bool) -> Self {
        self.policy_errors_end_loop = enabled;
        self
    }

    pub fn with_column_name_format(mut self, format: impl Into<String>) -> Self {
        self.set_column_name_format(format);
        self
    }

    pub fn with_header_row_select(mut self, policy: HeaderRowSelect) -> Self {
        self.set_header_row_select(Some(policy));
        self
    }

    pub fn with_header_select(mut self, policy: HeaderSelect) -> Self {
        self.set_header_select(Some(policy));
        self
    }

    pub fn with_row_select(mut self, policy: RowSelect) -> Self {
        self.set_row_select(Some(policy));
        self
    }

    pub fn with_column_type_select(mut self, policy: ColumnTypeSelect) -> Self {
        self.set_column_type_select(Some(policy));
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

fn default_header_row_select_policy() -> HeaderRowSelect {
    HeaderRowSelect::new("default_header_row_select", default_header_row_select)
}

fn default_header_select_policy() -> HeaderSelect {
    HeaderSelect::new("default_header_select", default_header_select)
}

fn default_row_select_policy() -> RowSelect {
    RowSelect::new("default_row_select", default_row_select)
}

fn default_column_type_select_policy() -> ColumnTypeSelect {
    ColumnTypeSelect::new("default_column_type_select", default_column_type_select)
}

/// Skip rows until one has a non-null field, or the table ends.
pub fn default_header_row_select(cursor: &mut dyn SheetCursor, _config: &TableConfig) -> ExtractionResult<()> {
    while cursor.has_current_row() && !has_non_null_field(cursor) {
        cursor.next_row()?;
    }
    Ok(())
}

/// One name per field of the current row.
///
/// Blank headers take the config's column name format; a name already used gets `_<index>`
/// appended until it is unique.
pub fn default_header_select(cursor: &mut dyn SheetCursor, config: &TableConfig) -> ExtractionResult<Vec<String>> {
    let field_count = cursor.field_count();
    let mut names: Vec<String> = Vec::with_capacity(field_count);
    for idx in 0..field_count {
        let mut name = match cursor.text(idx)? {
            Some(text) if !text.trim().is_empty() => text,
            _ => config.column_name_format.apply(idx),
        };
        while names.contains(&name) {
            name = format!("{name}_{idx}");
        }
        names.push(name);
    }
    Ok(names)
}

/// Copy every non-null field into `row`, bounded by the row's width.
///
/// Fields past the source field count read as null and are left untouched.
pub fn default_row_select(
    cursor: &mut dyn SheetCursor,
    _config: &TableConfig,
    row: &mut [Value],
) -> ExtractionResult<Step> {
    for (idx, slot) in row.iter_mut().enumerate() {
        if cursor.is_null(idx) {
            continue;
        }
        *slot = cursor.value(idx)?;
    }
    Ok(Step::Continue)
}

/// Type of the column's last non-null value, `None` if every value is null.
///
/// Last wins: a column holding `1, 2, "n/a"` resolves to [`DataType::Utf8`], while
/// `"n/a", 1, 2` resolves to [`DataType::Int64`] and then fails conversion on `"n/a"`.
pub fn default_column_type_select(table: &Table, index: usize, _config: &TableConfig) -> Option<DataType> {
    table.column_values(index).filter_map(Value::data_type).last()
}
