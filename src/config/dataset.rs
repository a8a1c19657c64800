//! Per-dataset extraction policy and its defaults.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::ExtractionResult;
use crate::extraction::observability::ExtractionObserver;
use crate::reader::SheetCursor;

use super::table::TableConfig;
use super::{Policy, Step};

/// Advances the cursor to the next table to extract, or reports that there is none.
pub type TableSelectFn = dyn Fn(&mut dyn SheetCursor, &DatasetConfig) -> ExtractionResult<Step> + Send + Sync;
/// Picks the [`TableConfig`] for the table the cursor is positioned on.
pub type TableConfigSelectFn = dyn Fn(&dyn SheetCursor, &DatasetConfig) -> ExtractionResult<TableConfig> + Send + Sync;

pub type TableSelect = Policy<TableSelectFn>;
pub type TableConfigSelect = Policy<TableConfigSelectFn>;

impl Policy<TableSelectFn> {
    /// Wrap a table selector.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&mut dyn SheetCursor, &DatasetConfig) -> ExtractionResult<Step> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(f))
    }
}

impl Policy<TableConfigSelectFn> {
    /// Wrap a table-config selector.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&dyn SheetCursor, &DatasetConfig) -> ExtractionResult<TableConfig> + Send + Sync + 'static,
    {
        Self::from_arc(name, Arc::new(f))
    }

    /// Use a clone of `config` for every table.
    pub fn fixed(config: TableConfig) -> Self {
        Self::new("fixed_table_config", move |_, _| Ok(config.clone()))
    }
}

/// Options controlling how a dataset (all tables of a cursor) is extracted.
#[derive(Clone)]
pub struct DatasetConfig {
    /// Treat an `Err` from the table selector as the end of the dataset instead of failing
    /// (default `false`). Swallowed errors are still reported to the observer.
    pub policy_errors_end_loop: bool,
    table_select: TableSelect,
    table_config_select: TableConfigSelect,
    observer: Option<Arc<dyn ExtractionObserver>>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            policy_errors_end_loop: false,
            table_select: default_table_select_policy(),
            table_config_select: default_table_config_select_policy(),
            observer: None,
        }
    }
}

impl fmt::Debug for DatasetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetConfig")
            .field("policy_errors_end_loop", &self.policy_errors_end_loop)
            .field("table_select", &self.table_select)
            .field("table_config_select", &self.table_config_select)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl DatasetConfig {
    pub fn table_select(&self) -> &TableSelect {
        &self.table_select
    }

    /// Replace the table selector; `None` restores [`default_table_select`].
    pub fn set_table_select(&mut self, policy: Option<TableSelect>) {
        self.table_select = policy.unwrap_or_else(default_table_select_policy);
    }

    pub fn table_config_select(&self) -> &TableConfigSelect {
        &self.table_config_select
    }

    /// Replace the table-config selector; `None` restores [`default_table_config_select`].
    pub fn set_table_config_select(&mut self, policy: Option<TableConfigSelect>) {
        self.table_config_select = policy.unwrap_or_else(default_table_config_select_policy);
    }

    pub fn observer(&self) -> Option<&Arc<dyn ExtractionObserver>> {
        self.observer.as_ref()
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn ExtractionObserver>>) {
        self.observer = observer;
    }

    pub fn with_table_select(mut self, policy: TableSelect) -> Self {
        self.set_table_select(Some(policy));
        self
    }

    pub fn with_table_config_select(mut self, policy: TableConfigSelect) -> Self {
        self.set_table_config_select(Some(policy));
        self
    }

    pub fn with_policy_errors_end_loop(mut self, enabled: bool) -> Self {
        self.policy_errors_end_loop = enabled;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

fn default_table_select_policy() -> TableSelect {
    TableSelect::new("default_table_select", default_table_select)
}

fn default_table_config_select_policy() -> TableConfigSelect {
    TableConfigSelect::new("default_table_config_select", default_table_config_select)
}

/// Advance to the next table with at least one field; [`Step::Stop`] once tables run out.
pub fn default_table_select(cursor: &mut dyn SheetCursor, _config: &DatasetConfig) -> ExtractionResult<Step> {
    while cursor.next_table()? {
        if cursor.field_count() >= 1 {
            return Ok(Step::Continue);
        }
    }
    Ok(Step::Stop)
}

/// A fresh [`TableConfig::default`] for every table.
pub fn default_table_config_select(_cursor: &dyn SheetCursor, _config: &DatasetConfig) -> ExtractionResult<TableConfig> {
    Ok(TableConfig::default())
}

#[cfg(test)]
mod tests {
    use super::{DatasetConfig, TableConfigSelect, TableSelect, default_table_select};
    use crate::config::{Step, TableConfig};
    use crate::reader::{MemoryCursor, MemoryTable, SheetCursor};
    use crate::types::Value;

    #[test]
    fn default_table_select_skips_tables_without_fields() {
        let mut c = MemoryCursor::new(vec![
            MemoryTable::empty("empty"),
            MemoryTable::new("data", vec![vec![Value::Int64(1)]]),
            MemoryTable::empty("trailing"),
        ]);
        let config = DatasetConfig::default();
        assert_eq!(default_table_select(&mut c, &config).unwrap(), Step::Continue);
        assert_eq!(c.table_name(), Some("data"));
        assert_eq!(default_table_select(&mut c, &config).unwrap(), Step::Stop);
        assert_eq!(c.table_name(), None);
    }

    #[test]
    fn setters_reset_to_defaults() {
        let mut config = DatasetConfig::default()
            .with_table_select(TableSelect::new("none", |_, _| Ok(Step::Stop)))
            .with_table_config_select(TableConfigSelect::fixed(TableConfig::default().with_use_header_row(false)));
        assert_eq!(config.table_select().name(), "none");
        assert_eq!(config.table_config_select().name(), "fixed_table_config");

        config.set_table_select(None);
        config.set_table_config_select(None);
        assert_eq!(config.table_select().name(), "default_table_select");
        assert_eq!(config.table_config_select().name(), "default_table_config_select");
    }
}
