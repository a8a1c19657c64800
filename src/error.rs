use thiserror::Error;

use crate::types::DataType;

/// Convenience result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Error type returned by readers, policies and the extraction pipeline.
///
/// Reader failures (I/O, CSV, workbook decoding) are never caught by the pipeline; they reach
/// the caller unchanged.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// `extract_table` was called on a cursor that is not positioned on a table.
    #[error("cursor is not positioned on a table")]
    NoCurrentTable,

    /// A field was read while the cursor had no current row.
    #[error("cursor is not positioned on a row")]
    NoCurrentRow,

    /// A field index beyond the current table's field count was read.
    #[error("field index {index} out of range (field count {field_count})")]
    FieldOutOfRange { index: usize, field_count: usize },

    /// A column name was added twice to the same table.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A row did not have one value per column.
    #[error("row has {actual} value(s) but table has {expected} column(s)")]
    RowWidth { expected: usize, actual: usize },

    /// A value could not be coerced into the column type chosen by type detection.
    #[error(
        "failed to convert value at row {row} column '{column}' of table '{table}' to {target}: {message} (raw='{raw}')"
    )]
    Conversion {
        table: String,
        row: usize,
        column: String,
        raw: String,
        target: DataType,
        message: String,
    },

    /// A caller-supplied policy reported a failure that should abort extraction.
    #[error("policy '{policy}' failed: {message}")]
    Policy { policy: String, message: String },

    /// A path-based entry point could not pick a reader for the input.
    #[error("unsupported source: {message}")]
    UnsupportedSource { message: String },
}

impl ExtractionError {
    /// Build a [`ExtractionError::Policy`] from a policy name and message.
    pub fn policy(policy: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Policy {
            policy: policy.into(),
            message: message.into(),
        }
    }
}
