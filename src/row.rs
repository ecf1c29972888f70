//! Result rows returned by executors.
//!
//! A [`Row`] is an ordered mapping from column name to [`Value`]. Columns are
//! matched by exact identifier; no case folding happens here.

use crate::value::{TryGetable, ValueExtractionError};
use sea_query::Value;
use std::fmt;
use std::sync::Arc;

/// Row mapping error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The row has no column with this name
    MissingColumn(String),
    /// The column exists but its value could not be converted
    Value {
        column: String,
        source: ValueExtractionError,
    },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingColumn(column) => write!(f, "Missing column: {column}"),
            RowError::Value { column, source } => {
                write!(f, "Invalid value in column {column}: {source}")
            }
        }
    }
}

impl std::error::Error for RowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RowError::MissingColumn(_) => None,
            RowError::Value { source, .. } => Some(source),
        }
    }
}

/// One result row.
///
/// Column names are shared between all rows of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from shared column names and the row's values, in column order.
    ///
    /// A column without a value reads as missing.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    ///
    /// ```rust
    /// use dwimdao::{Row, Value};
    ///
    /// let row = Row::from_pairs([("id", Value::from(17i64)), ("firstname", Value::from("first"))]);
    /// let id: i64 = row.try_get("id").unwrap();
    /// assert_eq!(id, 17);
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column named exactly `column`.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Value at position `idx`.
    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Extract and convert the value of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::MissingColumn`] if no column matches exactly, or
    /// [`RowError::Value`] if the value cannot be converted to `T`.
    pub fn try_get<T: TryGetable>(&self, column: &str) -> Result<T, RowError> {
        let value = self
            .get_value(column)
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))?;
        T::try_get(value.clone()).map_err(|source| RowError::Value {
            column: column.to_string(),
            source,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
