//! Multi-table extraction.

use std::borrow::Cow;

use crate::config::{DatasetConfig, Step};
use crate::error::ExtractionResult;
use crate::reader::SheetCursor;
use crate::types::Dataset;

use super::observability::{ExtractionEvent, notify, report_failure};
use super::table::{policy_stopped, run_table};

/// Extract every table the dataset config selects, in cursor order.
///
/// Each iteration asks the table selector to advance the cursor. [`Step::Stop`] ends the
/// dataset; otherwise the table-config selector picks a [`crate::config::TableConfig`] and the
/// table is extracted with [`super::extract_table`] semantics. A table config without an observer
/// inherits the dataset's.
///
/// `None` uses [`DatasetConfig::default`], which extracts every table with at least one field
/// using default table settings.
pub fn extract_dataset(cursor: &mut dyn SheetCursor, config: Option<&DatasetConfig>) -> ExtractionResult<Dataset> {
    let config: Cow<'_, DatasetConfig> = config.map(Cow::Borrowed).unwrap_or_default();
    let result = run_dataset(cursor, &config);
    if let Err(e) = &result {
        report_failure(config.observer(), e);
    }
    result
}

fn run_dataset(cursor: &mut dyn SheetCursor, config: &DatasetConfig) -> ExtractionResult<Dataset> {
    let observer = config.observer();
    notify(observer, || ExtractionEvent::DatasetStarted {
        config: format!("{config:?}"),
    });

    let table_select = config.table_select();
    let mut dataset = Dataset::new();
    loop {
        match (table_select.func())(cursor, config) {
            Ok(Step::Continue) => {}
            Ok(Step::Stop) => {
                policy_stopped(observer, table_select.name(), None);
                break;
            }
            // Legacy behavior: a failing table selector marks the end of the dataset.
            Err(e) if config.policy_errors_end_loop => {
                policy_stopped(observer, table_select.name(), Some(&e));
                break;
            }
            Err(e) => return Err(e),
        }

        let mut table_config = (config.table_config_select().func())(&*cursor, config)?;
        if table_config.observer().is_none() {
            table_config.set_observer(observer.cloned());
        }
        dataset.tables.push(run_table(cursor, &table_config)?);
    }

    notify(observer, || ExtractionEvent::DatasetFinished {
        tables: dataset.table_count(),
    });
    Ok(dataset)
}
