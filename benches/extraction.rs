use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sheet_tables::config::TableConfig;
use sheet_tables::extraction::{extract_dataset, extract_table};
use sheet_tables::reader::{MemoryCursor, MemoryTable, SheetCursor};
use sheet_tables::types::Value;

fn sample_rows(rows: usize) -> Vec<Vec<Value>> {
    let mut out = Vec::with_capacity(rows + 1);
    out.push(vec![
        Value::Utf8("id".to_string()),
        Value::Utf8("name".to_string()),
        Value::Utf8("score".to_string()),
        Value::Utf8("active".to_string()),
    ]);
    for i in 0..rows {
        out.push(vec![
            Value::Int64(i as i64),
            Value::Utf8(format!("name-{i}")),
            if i % 7 == 0 { Value::Null } else { Value::Float64(i as f64 * 0.5) },
            Value::Bool(i % 2 == 0),
        ]);
    }
    out
}

fn bench_extract_table(c: &mut Criterion) {
    let rows = sample_rows(10_000);
    let detect = TableConfig::default();
    let raw = TableConfig::default().with_detect_column_types(false);

    c.bench_function("extract_table_10k_detect_types", |b| {
        b.iter(|| {
            let mut cursor = MemoryCursor::single("bench", rows.clone());
            cursor.next_table().unwrap();
            black_box(extract_table(&mut cursor, Some(&detect)).unwrap())
        })
    });

    c.bench_function("extract_table_10k_raw", |b| {
        b.iter(|| {
            let mut cursor = MemoryCursor::single("bench", rows.clone());
            cursor.next_table().unwrap();
            black_box(extract_table(&mut cursor, Some(&raw)).unwrap())
        })
    });
}

fn bench_extract_dataset(c: &mut Criterion) {
    let tables: Vec<MemoryTable> = (0..8)
        .map(|i| MemoryTable::new(format!("sheet{i}"), sample_rows(1_000)))
        .collect();

    c.bench_function("extract_dataset_8x1k", |b| {
        b.iter(|| {
            let mut cursor = MemoryCursor::new(tables.clone());
            black_box(extract_dataset(&mut cursor, None).unwrap())
        })
    });
}

criterion_group!(benches, bench_extract_table, bench_extract_dataset);
criterion_main!(benches);
