//! Fixtures for tests: an in-memory SQLite store with a `User` table.

use crate::executor::{ExecError, Executor};
use crate::raw_sql::{execute_statement, execute_unprepared};
use crate::sqlite::SqliteExecutor;
use sea_query::Value;

/// Schema of the `User` table used throughout the tests.
pub const USER_SCHEMA: &str =
    "CREATE TABLE User (id INTEGER PRIMARY KEY, firstname TEXT NOT NULL, secondname TEXT NOT NULL)";

/// A fresh in-memory store with an empty `User` table.
///
/// # Errors
///
/// Returns `ExecError` if SQLite cannot create the database.
pub fn users_store() -> Result<SqliteExecutor, ExecError> {
    let store = SqliteExecutor::open_in_memory()?;
    execute_unprepared(&store, USER_SCHEMA)?;
    Ok(store)
}

/// Insert one user.
///
/// # Errors
///
/// Returns `ExecError` on constraint violations.
pub fn insert_user<E: Executor + ?Sized>(
    store: &E,
    id: i64,
    firstname: &str,
    secondname: &str,
) -> Result<(), ExecError> {
    execute_statement(
        store,
        "INSERT INTO User (id, firstname, secondname) VALUES (?, ?, ?)",
        &[Value::from(id), Value::from(firstname), Value::from(secondname)],
    )?;
    Ok(())
}

/// Insert `(id, firstname, secondname)` rows in order.
///
/// # Errors
///
/// Returns the first insert error.
pub fn seed_users<E: Executor + ?Sized>(store: &E, users: &[(i64, &str, &str)]) -> Result<(), ExecError> {
    for (id, firstname, secondname) in users {
        insert_user(store, *id, firstname, secondname)?;
    }
    Ok(())
}
