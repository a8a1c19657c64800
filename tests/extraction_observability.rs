use std::sync::{Arc, Mutex};

use sheet_tables::config::{DatasetConfig, RowSelect, TableConfig, TableSelect};
use sheet_tables::extraction::{
    ExtractionEvent, ExtractionObserver, ExtractionSeverity, FileObserver, SourceOptions, extract_dataset,
    extract_dataset_from_path, extract_table, extract_table_from_path,
};
use sheet_tables::reader::{MemoryCursor, MemoryTable, SheetCursor};
use sheet_tables::types::{DataType, Value};
use sheet_tables::ExtractionError;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<ExtractionEvent>>,
    failures: Mutex<Vec<ExtractionSeverity>>,
}

impl ExtractionObserver for RecordingObserver {
    fn on_event(&self, event: &ExtractionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_failure(&self, severity: ExtractionSeverity, _error: &ExtractionError) {
        self.failures.lock().unwrap().push(severity);
    }
}

fn s(v: &str) -> Value {
    Value::Utf8(v.to_string())
}

#[test]
fn table_events_describe_the_extraction() {
    let obs = Arc::new(RecordingObserver::default());
    let mut c = MemoryCursor::single("t", vec![vec![s("n")], vec![Value::Int64(1)]]);
    c.next_table().unwrap();

    let config = TableConfig::default().with_observer(obs.clone());
    extract_table(&mut c, Some(&config)).unwrap();

    let events = obs.events.lock().unwrap().clone();
    match &events[0] {
        ExtractionEvent::TableStarted { table, config } => {
            assert_eq!(table, "t");
            assert!(config.contains("default_row_select"));
        }
        other => panic!("unexpected first event: {other:?}"),
    }
    assert!(events.contains(&ExtractionEvent::HeaderResolved {
        table: "t".to_string(),
        columns: vec!["n".to_string()],
    }));
    assert!(events.contains(&ExtractionEvent::RowsRead {
        table: "t".to_string(),
        rows: 1,
    }));
    assert!(events.contains(&ExtractionEvent::ColumnTypeChanged {
        table: "t".to_string(),
        column: "n".to_string(),
        from: DataType::Any,
        to: DataType::Int64,
    }));
    assert_eq!(
        events.last(),
        Some(&ExtractionEvent::TableFinished {
            table: "t".to_string(),
            rows: 1,
            columns: 1,
        })
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn swallowed_policy_errors_are_still_reported() {
    let obs = Arc::new(RecordingObserver::default());
    let mut c = MemoryCursor::single("t", vec![vec![s("n")], vec![Value::Int64(1)]]);
    c.next_table().unwrap();

    let config = TableConfig::default()
        .with_row_select(RowSelect::new("always_fails", |_, _, _| {
            Err(ExtractionError::policy("always_fails", "boom"))
        }))
        .with_policy_errors_end_loop(true)
        .with_observer(obs.clone());
    let table = extract_table(&mut c, Some(&config)).unwrap();
    assert_eq!(table.row_count(), 0);

    let events = obs.events.lock().unwrap().clone();
    assert!(events.iter().any(|e| matches!(
        e,
        ExtractionEvent::PolicyStopped { policy, error: Some(msg) }
            if policy == "always_fails" && msg.contains("boom")
    )));
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![ExtractionSeverity::Warning]);
}

#[test]
fn dataset_observer_is_inherited_by_tables() {
    let obs = Arc::new(RecordingObserver::default());
    let mut c = MemoryCursor::new(vec![
        MemoryTable::new("a", vec![vec![s("x")]]),
        MemoryTable::new("b", vec![vec![s("y")]]),
    ]);
    let config = DatasetConfig::default().with_observer(obs.clone());
    extract_dataset(&mut c, Some(&config)).unwrap();

    let events = obs.events.lock().unwrap().clone();
    assert!(matches!(events.first(), Some(ExtractionEvent::DatasetStarted { .. })));
    let finished = events
        .iter()
        .filter(|e| matches!(e, ExtractionEvent::TableFinished { .. }))
        .count();
    assert_eq!(finished, 2);
    assert_eq!(events.last(), Some(&ExtractionEvent::DatasetFinished { tables: 2 }));
}

#[test]
fn failures_are_reported_once_with_severity() {
    let obs = Arc::new(RecordingObserver::default());
    let mut c = MemoryCursor::new(vec![MemoryTable::new(
        "bad",
        vec![vec![s("n")], vec![s("n/a")], vec![Value::Int64(1)]],
    )]);
    let config = DatasetConfig::default().with_observer(obs.clone());
    let _ = extract_dataset(&mut c, Some(&config)).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![ExtractionSeverity::Error]);
}

#[test]
fn missing_file_is_critical() {
    let obs = Arc::new(RecordingObserver::default());
    let options = SourceOptions {
        dataset: DatasetConfig::default().with_observer(obs.clone()),
        ..Default::default()
    };
    let _ = extract_dataset_from_path("tests/fixtures/does_not_exist.csv", &options).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![ExtractionSeverity::Critical]);
}

#[test]
fn table_from_missing_file_is_reported_to_the_dataset_observer() {
    let obs = Arc::new(RecordingObserver::default());
    let options = SourceOptions {
        dataset: DatasetConfig::default().with_observer(obs.clone()),
        ..Default::default()
    };
    let _ = extract_table_from_path("tests/fixtures/does_not_exist.csv", &options, None).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![ExtractionSeverity::Critical]);
}

#[test]
fn table_from_path_honours_the_legacy_selector_flag() {
    let obs = Arc::new(RecordingObserver::default());
    let refuse = TableSelect::new("refuse", |_, _| Err(ExtractionError::policy("refuse", "no tables today")));
    let mut options = SourceOptions {
        dataset: DatasetConfig::default()
            .with_table_select(refuse)
            .with_observer(obs.clone()),
        ..Default::default()
    };

    let err = extract_table_from_path("tests/fixtures/people.csv", &options, None).unwrap_err();
    assert!(matches!(err, ExtractionError::Policy { .. }));
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![ExtractionSeverity::Error]);

    obs.failures.lock().unwrap().clear();
    options.dataset.policy_errors_end_loop = true;
    let table = extract_table_from_path("tests/fixtures/people.csv", &options, None).unwrap();
    assert!(table.is_none());
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![ExtractionSeverity::Warning]);
    assert!(obs.events.lock().unwrap().iter().any(|e| matches!(
        e,
        ExtractionEvent::PolicyStopped { policy, error: Some(_) } if policy == "refuse"
    )));
}

#[test]
fn file_observer_appends_lines() {
    let path = std::env::temp_dir().join(format!("sheet-tables-observer-{}.log", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut c = MemoryCursor::single("t", vec![vec![s("n")]]);
    c.next_table().unwrap();
    let config = TableConfig::default().with_observer(Arc::new(FileObserver::new(&path)));
    extract_table(&mut c, Some(&config)).unwrap();

    let log = std::fs::read_to_string(&path).unwrap();
    assert!(log.lines().count() >= 3);
    assert!(log.contains("TableFinished"));
    let _ = std::fs::remove_file(&path);
}
