use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExtractionError;
use crate::types::DataType;

/// Severity classification used for failure callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExtractionSeverity {
    /// A policy error was swallowed because `policy_errors_end_loop` is set; extraction went on.
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Progress events emitted by the extraction pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    DatasetStarted {
        /// `Debug` rendering of the dataset config (policy names included).
        config: String,
    },
    TableStarted {
        table: String,
        /// `Debug` rendering of the table config (policy names included).
        config: String,
    },
    HeaderResolved {
        table: String,
        columns: Vec<String>,
    },
    RowsRead {
        table: String,
        rows: usize,
    },
    ColumnTypeChanged {
        table: String,
        column: String,
        from: DataType,
        to: DataType,
    },
    TableFinished {
        table: String,
        rows: usize,
        columns: usize,
    },
    /// A looping policy ended its loop. `error` is set when a policy error was swallowed.
    PolicyStopped {
        policy: String,
        error: Option<String>,
    },
    DatasetFinished {
        tables: usize,
    },
}

/// Observer interface for extraction progress and failures.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ExtractionObserver: Send + Sync {
    /// Called for every progress event.
    fn on_event(&self, _event: &ExtractionEvent) {}

    /// Called once when an extraction call fails, and with [`ExtractionSeverity::Warning`] for
    /// every swallowed policy error.
    fn on_failure(&self, _severity: ExtractionSeverity, _error: &ExtractionError) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ExtractionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ExtractionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ExtractionObserver for CompositeObserver {
    fn on_event(&self, event: &ExtractionEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }

    fn on_failure(&self, severity: ExtractionSeverity, error: &ExtractionError) {
        for o in &self.observers {
            o.on_failure(severity, error);
        }
    }
}

/// Logs extraction events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ExtractionObserver for StdErrObserver {
    fn on_event(&self, event: &ExtractionEvent) {
        eprintln!("[extract] {event:?}");
    }

    fn on_failure(&self, severity: ExtractionSeverity, error: &ExtractionError) {
        eprintln!("[extract][{severity:?}] err={error}");
    }
}

/// Appends extraction events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ExtractionObserver for FileObserver {
    fn on_event(&self, event: &ExtractionEvent) {
        self.append_line(&format!("{} event {event:?}", unix_ts()));
    }

    fn on_failure(&self, severity: ExtractionSeverity, error: &ExtractionError) {
        self.append_line(&format!("{} fail severity={severity:?} err={error}", unix_ts()));
    }
}

/// Severity the pipeline reports for a failed extraction.
pub fn severity_for_error(e: &ExtractionError) -> ExtractionSeverity {
    match e {
        ExtractionError::Io(_) => ExtractionSeverity::Critical,
        ExtractionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ExtractionSeverity::Critical,
            _ => ExtractionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        ExtractionError::Excel(_) => ExtractionSeverity::Error,
        ExtractionError::NoCurrentTable
        | ExtractionError::NoCurrentRow
        | ExtractionError::FieldOutOfRange { .. }
        | ExtractionError::DuplicateColumn { .. }
        | ExtractionError::RowWidth { .. }
        | ExtractionError::Conversion { .. }
        | ExtractionError::Policy { .. }
        | ExtractionError::UnsupportedSource { .. } => ExtractionSeverity::Error,
    }
}

pub(crate) fn notify(observer: Option<&Arc<dyn ExtractionObserver>>, event: impl FnOnce() -> ExtractionEvent) {
    if let Some(o) = observer {
        o.on_event(&event());
    }
}

pub(crate) fn report_failure(observer: Option<&Arc<dyn ExtractionObserver>>, error: &ExtractionError) {
    if let Some(o) = observer {
        o.on_failure(severity_for_error(error), error);
    }
}

pub(crate) fn report_swallowed(observer: Option<&Arc<dyn ExtractionObserver>>, error: &ExtractionError) {
    if let Some(o) = observer {
        o.on_failure(ExtractionSeverity::Warning, error);
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
