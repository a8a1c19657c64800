#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;

use sheet_tables::extraction::{SheetSelection, SourceOptions, extract_dataset, extract_dataset_from_path};
use sheet_tables::reader::{SheetCursor, WorkbookCursor};
use sheet_tables::types::{DataType, Value};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sheet-tables-{name}-{nanos}.xlsx"))
}

fn write_workbook(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();

    // People: one blank leading row, a blank header cell, a duplicate header.
    let ws1 = wb.add_worksheet();
    ws1.set_name("People").unwrap();
    ws1.write_string(1, 0, "Name").unwrap();
    ws1.write_string(1, 2, "Name").unwrap();
    ws1.write_string(2, 0, "Alice").unwrap();
    ws1.write_number(2, 1, 30).unwrap();
    ws1.write_string(2, 2, "X").unwrap();
    ws1.write_string(3, 0, "Bob").unwrap();
    ws1.write_string(3, 2, "Y").unwrap();

    // Empty sheet: skipped by the default table selector.
    let ws2 = wb.add_worksheet();
    ws2.set_name("Empty").unwrap();

    // Flags: booleans and floats.
    let ws3 = wb.add_worksheet();
    ws3.set_name("Flags").unwrap();
    ws3.write_string(0, 0, "active").unwrap();
    ws3.write_string(0, 1, "score").unwrap();
    ws3.write_boolean(1, 0, true).unwrap();
    ws3.write_number(1, 1, 98.5).unwrap();
    ws3.write_boolean(2, 0, false).unwrap();
    ws3.write_number(2, 1, 87.25).unwrap();

    wb.save(path).unwrap();
}

#[test]
fn workbook_dataset_happy_path() {
    let path = tmp_file("dataset");
    write_workbook(&path);

    let ds = extract_dataset_from_path(&path, &SourceOptions::default()).unwrap();
    assert_eq!(ds.table_names(), vec!["People", "Flags"]);

    let people = &ds.tables[0];
    assert_eq!(people.column_names(), vec!["Name", "Column_1", "Name_2"]);
    assert_eq!(people.row_count(), 2);
    assert_eq!(people.get(0, "Name"), Some(&Value::Utf8("Alice".to_string())));
    assert_eq!(people.get(0, "Column_1"), Some(&Value::Float64(30.0)));
    assert_eq!(people.get(1, "Column_1"), Some(&Value::Null));
    assert_eq!(people.schema().fields[1].data_type, DataType::Float64);

    let flags = &ds.tables[1];
    assert_eq!(flags.get(1, "active"), Some(&Value::Bool(false)));
    assert_eq!(flags.get(0, "score"), Some(&Value::Float64(98.5)));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_cursor_exposes_empty_sheets_with_no_fields() {
    let path = tmp_file("cursor");
    write_workbook(&path);

    let mut c = WorkbookCursor::open(&path).unwrap();
    assert!(c.next_table().unwrap());
    assert_eq!(c.table_name(), Some("People"));
    assert_eq!(c.field_count(), 3);
    assert!(c.next_row().unwrap());
    // Leading blank row is kept.
    assert!(c.is_null(0));

    assert!(c.next_table().unwrap());
    assert_eq!(c.table_name(), Some("Empty"));
    assert_eq!(c.field_count(), 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn workbook_selected_sheets_only() {
    let path = tmp_file("selected");
    write_workbook(&path);

    let mut c = WorkbookCursor::open_sheets(&path, Some(&["Flags"])).unwrap();
    let ds = extract_dataset(&mut c, None).unwrap();
    assert_eq!(ds.table_names(), vec!["Flags"]);

    let options = SourceOptions {
        sheets: SheetSelection::Sheets(vec!["People".to_string()]),
        ..Default::default()
    };
    let ds = extract_dataset_from_path(&path, &options).unwrap();
    assert_eq!(ds.table_names(), vec!["People"]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn date_cells_become_datetime_values() {
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    let path = tmp_file("dates");
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Dates").unwrap();
    let jan = ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
    let feb = ExcelDateTime::from_ymd(2024, 2, 1).unwrap();
    ws.write_datetime_with_format(0, 0, &jan, &date_format).unwrap();
    ws.write_datetime_with_format(1, 0, &feb, &date_format).unwrap();
    wb.save(&path).unwrap();

    let ds = extract_dataset_from_path(&path, &SourceOptions::default()).unwrap();
    let table = &ds.tables[0];
    // A date header renders as ISO text.
    assert_eq!(table.column_names(), vec!["2024-01-15"]);
    assert_eq!(table.schema().fields[0].data_type, DataType::DateTime);
    let expected = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(table.rows(), &[vec![Value::DateTime(expected)]]);

    let _ = std::fs::remove_file(&path);
}
