//! SQLite executor backed by `rusqlite`.
//!
//! The connection sits behind a `Mutex`, so one executor can be shared by many
//! threads or coroutines; statements on it run one at a time.

use crate::executor::{ExecError, Executor};
use crate::row::Row;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::Connection;
use sea_query::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// Implementation of `Executor` for a `rusqlite::Connection`
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::SqliteError` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExecError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `ExecError::SqliteError` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, ExecError> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Run several `;`-separated statements without parameters (schema setup).
    ///
    /// # Errors
    ///
    /// Returns `ExecError::SqliteError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), ExecError> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ExecError> {
        self.conn
            .lock()
            .map_err(|_| ExecError::Other("SQLite connection mutex poisoned".to_string()))
    }
}

fn to_sqlite(value: &Value) -> Result<SqliteValue, ExecError> {
    fn int<T: Into<i64>>(v: Option<T>) -> SqliteValue {
        v.map_or(SqliteValue::Null, |v| SqliteValue::Integer(v.into()))
    }

    let converted = match value {
        Value::Bool(v) => v.map_or(SqliteValue::Null, |b| SqliteValue::Integer(i64::from(b))),
        Value::TinyInt(v) => int(*v),
        Value::SmallInt(v) => int(*v),
        Value::Int(v) => int(*v),
        Value::BigInt(v) => int(*v),
        Value::TinyUnsigned(v) => int(*v),
        Value::SmallUnsigned(v) => int(*v),
        Value::Unsigned(v) => int(*v),
        Value::BigUnsigned(v) => match v {
            Some(u) => SqliteValue::Integer(i64::try_from(*u).map_err(|_| {
                ExecError::Other(format!("BigUnsigned value {u} exceeds i64::MAX"))
            })?),
            None => SqliteValue::Null,
        },
        Value::Float(v) => v.map_or(SqliteValue::Null, |f| SqliteValue::Real(f64::from(f))),
        Value::Double(v) => v.map_or(SqliteValue::Null, SqliteValue::Real),
        Value::String(v) => v.clone().map_or(SqliteValue::Null, SqliteValue::Text),
        Value::Char(v) => v.map_or(SqliteValue::Null, |c| SqliteValue::Text(c.to_string())),
        Value::Bytes(v) => v.clone().map_or(SqliteValue::Null, SqliteValue::Blob),
        Value::Json(v) => match v {
            Some(j) => SqliteValue::Text(
                serde_json::to_string(&**j)
                    .map_err(|e| ExecError::Other(format!("Failed to serialize JSON: {e}")))?,
            ),
            None => SqliteValue::Null,
        },
        other => {
            return Err(ExecError::Other(format!(
                "Unsupported value type in query: {other:?}"
            )));
        }
    };
    Ok(converted)
}

fn from_sqlite(column: &str, value: ValueRef<'_>) -> Result<Value, ExecError> {
    let converted = match value {
        // SQLite nulls are untyped; every null variant reads back as null
        ValueRef::Null => Value::String(None),
        ValueRef::Integer(i) => Value::BigInt(Some(i)),
        ValueRef::Real(f) => Value::Double(Some(f)),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                ExecError::ParseError(format!("column {column} holds invalid UTF-8 text: {e}"))
            })?;
            Value::String(Some(text.to_owned()))
        }
        ValueRef::Blob(bytes) => Value::Bytes(Some(bytes.to_vec())),
    };
    Ok(converted)
}

impl Executor for SqliteExecutor {
    fn execute(&self, query: &str, params: &[Value]) -> Result<u64, ExecError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let params = params.iter().map(to_sqlite).collect::<Result<Vec<_>, _>>()?;
        let conn = self.lock()?;
        let affected = conn.execute(query, rusqlite::params_from_iter(params))?;
        Ok(affected as u64)
    }

    fn query_all(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, ExecError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let params = params.iter().map(to_sqlite).collect::<Result<Vec<_>, _>>()?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let values = columns
                .iter()
                .enumerate()
                .map(|(idx, column)| from_sqlite(column, row.get_ref(idx)?))
                .collect::<Result<Vec<_>, _>>()?;
            results.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(results)
    }
}
