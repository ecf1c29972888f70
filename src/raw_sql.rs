//! Raw SQL helpers.
//!
//! Pass-through statements for work a contract does not describe (schema
//! setup, writes, aggregates). They use the executor's own placeholder syntax.

use crate::executor::{ExecError, Executor};
use crate::row::Row;
use crate::value::TryGetable;
use sea_query::Value;

/// Execute a statement without parameters and return the number of rows affected.
///
/// # Errors
///
/// Returns `ExecError` if the SQL execution fails.
///
/// # Examples
///
/// ```no_run
/// use dwimdao::{connect, execute_unprepared};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = connect("sqlite::memory:")?;
/// execute_unprepared(&store, "CREATE TABLE User (id INTEGER PRIMARY KEY, firstname TEXT)")?;
/// # Ok(())
/// # }
/// ```
pub fn execute_unprepared<E: Executor + ?Sized>(executor: &E, sql: &str) -> Result<u64, ExecError> {
    executor.execute(sql, &[])
}

/// Execute a parameterized statement and return the number of rows affected.
///
/// # Errors
///
/// Returns `ExecError` if the SQL execution fails.
pub fn execute_statement<E: Executor + ?Sized>(
    executor: &E,
    sql: &str,
    params: &[Value],
) -> Result<u64, ExecError> {
    executor.execute(sql, params)
}

/// Query at most one row.
///
/// # Errors
///
/// Returns `ExecError::MultipleRows` if more than one row is returned, or any
/// execution error.
pub fn find_by_statement<E: Executor + ?Sized>(
    executor: &E,
    sql: &str,
    params: &[Value],
) -> Result<Option<Row>, ExecError> {
    executor.query_opt(sql, params)
}

/// Query all rows, in store order.
///
/// # Errors
///
/// Returns `ExecError` if the query execution fails.
pub fn find_all_by_statement<E: Executor + ?Sized>(
    executor: &E,
    sql: &str,
    params: &[Value],
) -> Result<Vec<Row>, ExecError> {
    executor.query_all(sql, params)
}

/// Query a single value: the first column of the only row.
///
/// ```no_run
/// use dwimdao::{connect, query_value};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = connect("sqlite::memory:")?;
/// let count: i64 = query_value(&store, "SELECT COUNT(*) FROM User", &[])?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns `ExecError` if:
/// - The query execution fails
/// - No rows are returned
/// - Multiple rows are returned
/// - Value extraction/conversion fails
pub fn query_value<T: TryGetable, E: Executor + ?Sized>(
    executor: &E,
    sql: &str,
    params: &[Value],
) -> Result<T, ExecError> {
    let row = executor
        .query_opt(sql, params)?
        .ok_or_else(|| ExecError::QueryError(format!("no rows returned by: {sql}")))?;
    let value = row
        .value_at(0)
        .cloned()
        .ok_or_else(|| ExecError::ParseError("query returned no columns".to_string()))?;
    T::try_get(value).map_err(|e| ExecError::ParseError(format!("Failed to extract value: {e}")))
}
