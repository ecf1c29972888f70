//! Value conversion between `sea_query::Value` and `may_postgres`.
//!
//! Bind values are boxed as typed `ToSql` objects (nulls keep their variant's
//! type so PostgreSQL can infer the parameter type), then borrowed as a slice for
//! the duration of the call. Result rows are decoded column by column according
//! to the column's PostgreSQL type.

use crate::executor::ExecError;
use crate::row::Row;
use may_postgres::types::{ToSql, Type};
use sea_query::Value;
use std::sync::Arc;

type Param = Box<dyn ToSql + Sync + Send>;

/// Convert values to `may_postgres` parameters and run `f` with them.
///
/// # Errors
///
/// Returns `ExecError::Other` if an unsupported value type is encountered.
pub fn with_converted_params<F, R>(values: &[Value], f: F) -> Result<R, ExecError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, ExecError>,
{
    let owned = values
        .iter()
        .map(to_sql_param)
        .collect::<Result<Vec<Param>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
    f(&params)
}

fn to_sql_param(value: &Value) -> Result<Param, ExecError> {
    let param: Param = match value {
        Value::Bool(v) => Box::new(*v),
        Value::TinyInt(v) => Box::new(v.map(i16::from)),
        Value::SmallInt(v) => Box::new(*v),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i16::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(v) => {
            let converted = v
                .map(|u| {
                    i64::try_from(u).map_err(|_| {
                        ExecError::Other(format!(
                            "BigUnsigned value {u} exceeds i64::MAX ({}), cannot be safely cast to i64",
                            i64::MAX
                        ))
                    })
                })
                .transpose()?;
            Box::new(converted)
        }
        Value::Float(v) => Box::new(*v),
        Value::Double(v) => Box::new(*v),
        Value::String(v) => Box::new(v.clone()),
        Value::Char(v) => Box::new(v.map(|c| c.to_string())),
        Value::Bytes(v) => Box::new(v.clone()),
        Value::Json(v) => {
            let text = v
                .as_ref()
                .map(|j| {
                    serde_json::to_string(&**j)
                        .map_err(|e| ExecError::Other(format!("Failed to serialize JSON: {e}")))
                })
                .transpose()?;
            Box::new(text)
        }
        other => {
            return Err(ExecError::Other(format!(
                "Unsupported value type in query: {other:?}"
            )));
        }
    };
    Ok(param)
}

/// Column names of a `may_postgres` row, shared by every row of the result.
pub fn column_names(row: &may_postgres::Row) -> Arc<[String]> {
    row.columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

/// Decode a `may_postgres` row into a [`Row`].
///
/// # Errors
///
/// Returns `ExecError::ParseError` for column types without a `Value` mapping.
pub fn decode_row(row: &may_postgres::Row, columns: &Arc<[String]>) -> Result<Row, ExecError> {
    let mut values = Vec::with_capacity(columns.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            Value::Bool(row.try_get::<usize, Option<bool>>(idx)?)
        } else if *ty == Type::INT2 {
            Value::SmallInt(row.try_get::<usize, Option<i16>>(idx)?)
        } else if *ty == Type::INT4 {
            Value::Int(row.try_get::<usize, Option<i32>>(idx)?)
        } else if *ty == Type::INT8 {
            Value::BigInt(row.try_get::<usize, Option<i64>>(idx)?)
        } else if *ty == Type::FLOAT4 {
            Value::Float(row.try_get::<usize, Option<f32>>(idx)?)
        } else if *ty == Type::FLOAT8 {
            Value::Double(row.try_get::<usize, Option<f64>>(idx)?)
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::BPCHAR
            || *ty == Type::NAME
        {
            Value::String(row.try_get::<usize, Option<String>>(idx)?)
        } else if *ty == Type::BYTEA {
            Value::Bytes(row.try_get::<usize, Option<Vec<u8>>>(idx)?)
        } else {
            return Err(ExecError::ParseError(format!(
                "Unsupported column type {ty} for column {}",
                column.name()
            )));
        };
        values.push(value);
    }
    Ok(Row::new(Arc::clone(columns), values))
}
