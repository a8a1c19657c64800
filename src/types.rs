//! Core data model for extraction output.
//!
//! Extraction produces a [`Table`] (a named [`Schema`] plus rows of [`Value`]s) or a
//! [`Dataset`] holding several tables in cursor order.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, ExtractionResult};

/// Logical data type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Variant column: holds any native value unchanged. Freshly extracted columns use it.
    Any,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
    /// Calendar date and time without a time zone.
    DateTime,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Any => "any",
            DataType::Bool => "bool",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
            DataType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing a table's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single native value read from a cursor or stored in a [`Table`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
    /// Date and time, e.g. a date-formatted workbook cell.
    DateTime(NaiveDateTime),
}

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type of the value, `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Utf8(_) => Some(DataType::Utf8),
            Value::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Convert the value to `target` using the standard conversion rules.
    ///
    /// Nulls stay null and [`DataType::Any`] accepts everything. On failure the returned
    /// message describes what was expected.
    pub fn coerce(self, target: DataType) -> Result<Value, String> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        match target {
            DataType::Any => Ok(self),
            DataType::Utf8 => match self {
                Value::Utf8(s) => Ok(Value::Utf8(s)),
                other => Ok(Value::Utf8(other.to_string())),
            },
            DataType::Int64 => to_i64(&self).map(Value::Int64),
            DataType::Float64 => to_f64(&self).map(Value::Float64),
            DataType::Bool => to_bool(&self).map(Value::Bool),
            DataType::DateTime => to_datetime(&self).map(Value::DateTime),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
            // Midnight renders as a plain date.
            Value::DateTime(dt) if dt.time() == NaiveTime::MIN => write!(f, "{}", dt.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

fn to_i64(v: &Value) -> Result<i64, String> {
    match v {
        Value::Int64(i) => Ok(*i),
        Value::Float64(f) => {
            if !f.is_finite() || f.fract() != 0.0 {
                Err("expected integer (got non-integer float)".to_string())
            } else if *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                Err(format!("value {f} is out of range for int64"))
            } else {
                Ok(*f as i64)
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Utf8(s) => s.trim().parse::<i64>().map_err(|e| e.to_string()),
        Value::DateTime(_) => Err("expected integer (got datetime)".to_string()),
        Value::Null => Err("expected integer".to_string()),
    }
}

fn to_f64(v: &Value) -> Result<f64, String> {
    match v {
        Value::Float64(f) => Ok(*f),
        Value::Int64(i) => Ok(*i as f64),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Utf8(s) => s.trim().parse::<f64>().map_err(|e| e.to_string()),
        Value::DateTime(_) => Err("expected number (got datetime)".to_string()),
        Value::Null => Err("expected number".to_string()),
    }
}

fn to_bool(v: &Value) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Int64(i) => Ok(*i != 0),
        Value::Float64(f) => Ok(*f != 0.0),
        Value::Utf8(s) => parse_bool(s),
        Value::DateTime(_) => Err("expected bool (got datetime)".to_string()),
        Value::Null => Err("expected bool".to_string()),
    }
}

fn to_datetime(v: &Value) -> Result<NaiveDateTime, String> {
    match v {
        Value::DateTime(dt) => Ok(*dt),
        Value::Utf8(s) => parse_datetime(s.trim()),
        _ => Err("expected datetime".to_string()),
    }
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .map_err(|_| "expected datetime (ISO 8601, e.g. 2024-01-15 or 2024-01-15T08:30:00)".to_string())
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

/// In-memory table produced by extraction.
///
/// Column names are unique and every row holds exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name (the sheet or file the rows came from).
    pub name: String,
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::default(),
            rows: Vec::new(),
        }
    }

    /// Create an empty table with the given schema.
    ///
    /// Fails if the schema repeats a column name.
    pub fn with_schema(name: impl Into<String>, schema: Schema) -> ExtractionResult<Self> {
        let mut table = Self::new(name);
        for field in schema.fields {
            table.add_column(field.name, field.data_type)?;
        }
        Ok(table)
    }

    /// Append a column. Only valid before rows are added.
    pub fn add_column(&mut self, name: impl Into<String>, data_type: DataType) -> ExtractionResult<()> {
        let name = name.into();
        if self.schema.index_of(&name).is_some() {
            return Err(ExtractionError::DuplicateColumn {
                table: self.name.clone(),
                column: name,
            });
        }
        if !self.rows.is_empty() {
            return Err(ExtractionError::RowWidth {
                expected: self.schema.len() + 1,
                actual: self.schema.len(),
            });
        }
        self.schema.fields.push(Field::new(name, data_type));
        Ok(())
    }

    /// Table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Row-major value storage.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Consume the table, returning its schema and rows.
    pub fn into_parts(self) -> (String, Schema, Vec<Vec<Value>>) {
        (self.name, self.schema, self.rows)
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.field_names().collect()
    }

    /// A null-filled row as wide as the table.
    pub fn new_row(&self) -> Vec<Value> {
        vec![Value::Null; self.column_count()]
    }

    /// Append a row; it must hold one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> ExtractionResult<()> {
        if row.len() != self.column_count() {
            return Err(ExtractionError::RowWidth {
                expected: self.column_count(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Value at `row` in the column named `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Ordered collection of [`Table`]s, in the order the cursor produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Extracted tables.
    pub tables: Vec<Table>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// First table with the given name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(Table::row_count).sum()
    }
}
