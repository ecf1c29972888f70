//! # dwimdao
//!
//! Do-what-I-mean data access objects on top of `may_postgres` (and SQLite).
//!
//! Declare a contract trait, let method names like `findByFirstNameAndSecondName`
//! describe the query, and bind the trait to an [`Executor`]:
//!
//! ```no_run
//! use dwimdao::{dao, DaoError, Record, SqliteExecutor};
//!
//! #[derive(Debug, Clone, PartialEq, Record)]
//! pub struct User {
//!     pub id: i64,
//!     pub firstname: String,
//!     pub secondname: String,
//! }
//!
//! #[dao]
//! pub trait UserDao {
//!     fn findById(&self, id: i64) -> Result<Option<User>, DaoError>;
//!     fn findByFirstNameAndSecondName(&self, first: &str, second: &str) -> Result<Vec<User>, DaoError>;
//!
//!     #[sql = "select * from user where secondname like ?"]
//!     fn searchSecondName(&self, pattern: &str) -> Result<Vec<User>, DaoError>;
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let users = dwimdao::bind::<dyn UserDao, _>(SqliteExecutor::open_in_memory()?);
//! let user = users.findById(17)?;
//! # Ok(())
//! # }
//! ```
//!
//! Finder queries are inferred by [`query::infer`]; an explicit `#[sql]` on a
//! method always wins over inference.

extern crate self as dwimdao;

pub mod config;
pub mod connection;
pub mod contract;
pub mod dao;
pub mod executor;
pub mod model;
pub mod query;
pub mod raw_sql;
pub mod row;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub mod test_helpers;
#[cfg(feature = "tracing")]
pub(crate) mod tracing_helpers;
pub mod value;

pub use config::DatabaseConfig;
pub use connection::{connect, BoxedExecutor, ConnectionError};
pub use contract::{Contract, ContractDescriptor, MethodDescriptor, ReturnType};
pub use dao::{bind, Dao, DaoError, Dispatched, Dispatcher, Plan, QuerySource, ResultShape};
pub use executor::{ExecError, Executor, MayPostgresExecutor};
pub use model::{FromRow, Record, RecordType};
pub use query::{infer, FinderQuery, InferError, Placeholders};
pub use raw_sql::{
    execute_statement, execute_unprepared, find_all_by_statement, find_by_statement, query_value,
};
pub use row::{Row, RowError};
pub use value::{TryGetable, ValueExtractionError};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteExecutor;

pub use dwimdao_derive::{dao, Record};
pub use sea_query::Value;
