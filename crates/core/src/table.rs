//! Table names and narrowed table rows.
//!
//! Rows arrive from the REST endpoint as arbitrary JSON objects. They are
//! narrowed once, at the fetch boundary, into [`TableRow`]: an ordered map
//! of column name to [`CellValue`]. Column order is whatever the server
//! returned.

use std::fmt;

use serde_json::{Map, Number, Value};

use crate::error::DecodeError;

/// Tables exported by the backup job, in export order.
pub const DEFAULT_TABLES: &[&str] = &[
    "configs",
    "offers",
    "royalties_metadata",
    "sales",
    "payouts",
];

/// Longest accepted table name (PostgreSQL identifier limit).
const MAX_TABLE_NAME_LEN: usize = 63;

/// A table name safe to interpolate into a URL path and a file name.
///
/// Only ASCII alphanumerics and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: &str) -> Result<Self, DecodeError> {
        let valid = !name.is_empty()
            && name.len() <= MAX_TABLE_NAME_LEN
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(DecodeError::InvalidTableName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl From<Value> for CellValue {
    /// Nested arrays and objects (e.g. `jsonb` columns) become their compact
    /// JSON text.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Text(nested.to_string()),
        }
    }
}

/// One row of a table, columns in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    columns: Vec<(String, CellValue)>,
}

impl TableRow {
    /// Narrow an untyped JSON row.
    ///
    /// `table` and `index` only feed the error message.
    pub fn from_json(table: &str, index: usize, value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(DecodeError::NotAnObject {
                table: table.to_string(),
                index,
            }),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        Self {
            columns: map.into_iter().map(|(k, v)| (k, CellValue::from(v))).collect(),
        }
    }

    /// Column names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.columns
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v)
    }
}

/// Narrow every row of a fetched table, failing on the first non-object.
pub fn rows_from_json(table: &str, values: Vec<Value>) -> Result<Vec<TableRow>, DecodeError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| TableRow::from_json(table, index, value))
        .collect()
}
