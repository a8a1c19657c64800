//! Single-table extraction.

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::{Step, TableConfig};
use crate::error::{ExtractionError, ExtractionResult};
use crate::reader::SheetCursor;
use crate::types::{DataType, Field, Schema, Table};

use super::observability::{ExtractionEvent, ExtractionObserver, notify, report_failure, report_swallowed};

/// Extract the table the cursor is positioned on.
///
/// Steps:
///
/// 1. Move to the first row.
/// 2. With `use_header_row`, locate the header row, turn it into column names and skip it.
///    Otherwise name `field_count` columns from the column name format.
/// 3. Copy rows until the table ends or the row copier returns [`Step::Stop`].
/// 4. With `detect_column_types`, retype the columns (see [`reconcile_column_types`]).
///
/// `None` uses [`TableConfig::default`]. Fails with [`ExtractionError::NoCurrentTable`] when the
/// cursor is not on a table; call [`SheetCursor::next_table`] first on a fresh cursor.
///
/// A table cut short by [`Step::Stop`] looks the same as one read to its end.
pub fn extract_table(cursor: &mut dyn SheetCursor, config: Option<&TableConfig>) -> ExtractionResult<Table> {
    let config: Cow<'_, TableConfig> = config.map(Cow::Borrowed).unwrap_or_default();
    let result = run_table(cursor, &config);
    if let Err(e) = &result {
        report_failure(config.observer(), e);
    }
    result
}

pub(crate) fn run_table(cursor: &mut dyn SheetCursor, config: &TableConfig) -> ExtractionResult<Table> {
    let observer = config.observer();
    let name = cursor
        .table_name()
        .ok_or(ExtractionError::NoCurrentTable)?
        .to_string();
    notify(observer, || ExtractionEvent::TableStarted {
        table: name.clone(),
        config: format!("{config:?}"),
    });

    let mut table = Table::new(name);
    cursor.next_row()?;

    if config.use_header_row {
        (config.header_row_select().func())(cursor, config)?;
        let headers = (config.header_select().func())(cursor, config)?;
        for header in &headers {
            table.add_column(header.as_str(), DataType::Any)?;
        }
        notify(observer, || ExtractionEvent::HeaderResolved {
            table: table.name.clone(),
            columns: headers,
        });
        cursor.next_row()?;
    } else {
        for idx in 0..cursor.field_count() {
            table.add_column(config.column_name_format().apply(idx), DataType::Any)?;
        }
    }

    read_rows(cursor, config, &mut table)?;

    if config.detect_column_types {
        table = reconcile_column_types(table, config)?;
    }

    notify(observer, || ExtractionEvent::TableFinished {
        table: table.name.clone(),
        rows: table.row_count(),
        columns: table.column_count(),
    });
    Ok(table)
}

fn read_rows(cursor: &mut dyn SheetCursor, config: &TableConfig, table: &mut Table) -> ExtractionResult<()> {
    let observer = config.observer();
    let row_select = config.row_select();

    while cursor.has_current_row() {
        let mut row = table.new_row();
        match (row_select.func())(cursor, config, &mut row) {
            Ok(Step::Continue) => table.push_row(row)?,
            Ok(Step::Stop) => {
                policy_stopped(observer, row_select.name(), None);
                break;
            }
            // Legacy behavior: a failing row copier marks the end of the table.
            Err(e) if config.policy_errors_end_loop => {
                policy_stopped(observer, row_select.name(), Some(&e));
                break;
            }
            Err(e) => return Err(e),
        }
        cursor.next_row()?;
    }

    notify(observer, || ExtractionEvent::RowsRead {
        table: table.name.clone(),
        rows: table.row_count(),
    });
    Ok(())
}

pub(crate) fn policy_stopped(
    observer: Option<&Arc<dyn ExtractionObserver>>,
    policy: &str,
    error: Option<&ExtractionError>,
) {
    notify(observer, || ExtractionEvent::PolicyStopped {
        policy: policy.to_string(),
        error: error.map(ToString::to_string),
    });
    if let Some(e) = error {
        report_swallowed(observer, e);
    }
}

/// Retype the columns of `table` using the config's column-type resolver.
///
/// The target schema is computed for every column first. Only when at least one column changes
/// type is a new table built, importing every row with values coerced to the new column types;
/// otherwise `table` is returned untouched. A value that cannot be coerced fails with
/// [`ExtractionError::Conversion`].
pub fn reconcile_column_types(table: Table, config: &TableConfig) -> ExtractionResult<Table> {
    let observer = config.observer();
    let resolve = config.column_type_select();

    let mut changed = false;
    let mut fields: Vec<Field> = Vec::with_capacity(table.column_count());
    for (idx, field) in table.schema().fields.iter().enumerate() {
        let target = (resolve.func())(&table, idx, config).unwrap_or(field.data_type);
        if target != field.data_type {
            changed = true;
            notify(observer, || ExtractionEvent::ColumnTypeChanged {
                table: table.name.clone(),
                column: field.name.clone(),
                from: field.data_type,
                to: target,
            });
        }
        fields.push(Field::new(field.name.clone(), target));
    }
    if !changed {
        return Ok(table);
    }

    let (name, _, rows) = table.into_parts();
    let mut retyped = Table::with_schema(name, Schema::new(fields))?;
    for (row_idx, row) in rows.into_iter().enumerate() {
        let mut out = Vec::with_capacity(row.len());
        for (value, field) in row.into_iter().zip(retyped.schema().fields.iter()) {
            let raw = value.to_string();
            let converted = value
                .coerce(field.data_type)
                .map_err(|message| ExtractionError::Conversion {
                    table: retyped.name.clone(),
                    row: row_idx,
                    column: field.name.clone(),
                    raw,
                    target: field.data_type,
                    message,
                })?;
            out.push(converted);
        }
        retyped.push_row(out)?;
    }
    Ok(retyped)
}
