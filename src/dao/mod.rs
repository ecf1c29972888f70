//! Contract binding and dispatch.
//!
//! [`Dispatcher::bind`] resolves every method of a [`ContractDescriptor`] into a
//! [`Plan`] up front. Each invocation then does a single linear pass: look up the
//! plan (or replay its rejection), run exactly one query through the
//! [`Executor`], map the rows.
//!
//! [`Dao`] is the same dispatcher tagged with the contract trait it implements;
//! `#[dao]` generates the trait impl on it, and [`bind`] creates one.

mod error;
mod plan;

pub use error::DaoError;
pub use plan::{Plan, QuerySource, ResultShape};

use error::Rejection;

use crate::contract::{Contract, ContractDescriptor};
use crate::executor::Executor;
use crate::model::{Record, RecordType};
use crate::row::Row;
use sea_query::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// Raw outcome of an invocation, before rows are mapped to records.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Single(Option<Row>),
    Sequence(Vec<Row>),
}

struct PlanTable {
    contract: String,
    plans: HashMap<String, Result<Plan, Rejection>>,
}

/// Dispatcher for one bound contract.
///
/// Holds no mutable state; clones share the plan table.
pub struct Dispatcher<E> {
    table: Arc<PlanTable>,
    executor: E,
}

impl<E: Executor> Dispatcher<E> {
    /// Bind `descriptor` to `executor`.
    ///
    /// Nothing is rejected here: methods that can never dispatch fail when
    /// they are called. When several methods share a name the first one wins.
    pub fn bind(descriptor: &ContractDescriptor, executor: E) -> Self {
        let placeholders = executor.placeholders();
        let mut plans = HashMap::with_capacity(descriptor.methods().len());
        for method in descriptor.methods() {
            plans
                .entry(method.name().to_string())
                .or_insert_with(|| plan::plan(method, placeholders));
        }
        log::debug!(
            "bound contract {} ({} methods, {:?} placeholders)",
            descriptor.name(),
            plans.len(),
            placeholders
        );

        Self {
            table: Arc::new(PlanTable {
                contract: descriptor.name().to_string(),
                plans,
            }),
            executor,
        }
    }

    pub fn contract_name(&self) -> &str {
        &self.table.contract
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The plan of `method`.
    ///
    /// # Errors
    ///
    /// `UnsupportedMethod` for undeclared or uninferable methods,
    /// `UnsupportedReturnType` for methods without a record shape.
    pub fn plan(&self, method: &str) -> Result<&Plan, DaoError> {
        match self.table.plans.get(method) {
            Some(Ok(plan)) => Ok(plan),
            Some(Err(rejection)) => Err(rejection.clone().into()),
            None => Err(DaoError::UnsupportedMethod {
                method: method.to_string(),
                reason: format!("not declared by contract {}", self.table.contract),
            }),
        }
    }

    /// The error a call to `method` fails with, for methods generated
    /// with a return type dispatch cannot produce.
    pub fn rejection(&self, method: &str) -> DaoError {
        match self.plan(method) {
            Err(err) => err,
            Ok(plan) => DaoError::UnsupportedReturnType {
                method: method.to_string(),
                declared: format!("{:?} of {}", plan.shape(), plan.record().name()),
            },
        }
    }

    /// Invoke `method` with positional `args` and return the unmapped rows.
    ///
    /// # Errors
    ///
    /// Rejections (before any store access), or `DaoError::Execution` from the executor.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Dispatched, DaoError> {
        let plan = self.plan(method)?;
        self.run(method, plan, args)
    }

    /// Invoke a single-record method.
    ///
    /// # Errors
    ///
    /// As [`Dispatcher::invoke`]; `UnsupportedReturnType` if `method` is not a
    /// single-record method of `R`; `Mapping` if the row does not fit `R`.
    pub fn find_one<R: Record>(&self, method: &str, args: &[Value]) -> Result<Option<R>, DaoError> {
        let plan = self.expect(method, ResultShape::Single, R::record_type())?;
        match self.run(method, plan, args)? {
            Dispatched::Single(row) => row.map(|row| map_row::<R>(method, &row)).transpose(),
            Dispatched::Sequence(_) => Err(self.rejection(method)),
        }
    }

    /// Invoke a sequence method.
    ///
    /// # Errors
    ///
    /// As [`Dispatcher::find_one`], for sequence methods.
    pub fn find_many<R: Record>(&self, method: &str, args: &[Value]) -> Result<Vec<R>, DaoError> {
        let plan = self.expect(method, ResultShape::Sequence, R::record_type())?;
        match self.run(method, plan, args)? {
            Dispatched::Sequence(rows) => rows.iter().map(|row| map_row::<R>(method, row)).collect(),
            Dispatched::Single(_) => Err(self.rejection(method)),
        }
    }

    fn expect(&self, method: &str, shape: ResultShape, record: RecordType) -> Result<&Plan, DaoError> {
        let plan = self.plan(method)?;
        if plan.shape() != shape || plan.record() != record {
            return Err(DaoError::UnsupportedReturnType {
                method: method.to_string(),
                declared: format!("{shape:?} of {}", record.name()),
            });
        }
        Ok(plan)
    }

    fn run(&self, method: &str, plan: &Plan, args: &[Value]) -> Result<Dispatched, DaoError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::dispatch_span(&self.table.contract, method).entered();

        log::debug!(
            "{}.{} [{:?}] {}",
            self.table.contract,
            method,
            plan.source(),
            plan.sql()
        );

        let dispatched = match plan.shape() {
            ResultShape::Single => Dispatched::Single(self.executor.query_opt(plan.sql(), args)?),
            ResultShape::Sequence => Dispatched::Sequence(self.executor.query_all(plan.sql(), args)?),
        };
        Ok(dispatched)
    }
}

fn map_row<R: Record>(method: &str, row: &Row) -> Result<R, DaoError> {
    R::from_row(row).map_err(|source| DaoError::Mapping {
        method: method.to_string(),
        source,
    })
}

impl<E: Clone> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            executor: self.executor.clone(),
        }
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.table.plans.keys().collect();
        methods.sort();
        f.debug_struct("Dispatcher")
            .field("contract", &self.table.contract)
            .field("methods", &methods)
            .finish_non_exhaustive()
    }
}

/// A contract trait `C` (as `dyn Trait`) bound to an executor.
///
/// `#[dao]` implements the trait for `Dao<dyn Trait, E>`; obtain one with [`bind`].
pub struct Dao<C: ?Sized, E> {
    dispatcher: Dispatcher<E>,
    _contract: PhantomData<fn(&C)>,
}

impl<C: Contract + ?Sized, E: Executor> Dao<C, E> {
    pub fn bind(executor: E) -> Self {
        Self {
            dispatcher: Dispatcher::bind(&C::descriptor(), executor),
            _contract: PhantomData,
        }
    }
}

impl<C: ?Sized, E: Executor> Dao<C, E> {
    pub fn dispatcher(&self) -> &Dispatcher<E> {
        &self.dispatcher
    }

    /// The bound store, for pass-through statements.
    pub fn executor(&self) -> &E {
        self.dispatcher.executor()
    }

    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Dispatched, DaoError> {
        self.dispatcher.invoke(method, args)
    }

    pub fn find_one<R: Record>(&self, method: &str, args: &[Value]) -> Result<Option<R>, DaoError> {
        self.dispatcher.find_one(method, args)
    }

    pub fn find_many<R: Record>(&self, method: &str, args: &[Value]) -> Result<Vec<R>, DaoError> {
        self.dispatcher.find_many(method, args)
    }

    pub fn rejection(&self, method: &str) -> DaoError {
        self.dispatcher.rejection(method)
    }
}

impl<C: ?Sized, E: Clone> Clone for Dao<C, E> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            _contract: PhantomData,
        }
    }
}

impl<C: ?Sized, E> fmt::Debug for Dao<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dao").field(&self.dispatcher).finish()
    }
}

/// Bind contract `C` to `executor`.
///
/// ```no_run
/// # use dwimdao::{dao, DaoError, Record, SqliteExecutor};
/// # #[derive(Record)] pub struct User { pub id: i64 }
/// #[dao]
/// pub trait UserDao {
///     fn findById(&self, id: i64) -> Result<Option<User>, DaoError>;
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let users = dwimdao::bind::<dyn UserDao, _>(SqliteExecutor::open_in_memory()?);
/// assert!(users.findById(42)?.is_none());
/// # Ok(())
/// # }
/// ```
pub fn bind<C: Contract + ?Sized, E: Executor>(executor: E) -> Dao<C, E> {
    Dao::bind(executor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{MethodDescriptor, ReturnType};
    use crate::executor::ExecError;
    use crate::model::FromRow;
    use crate::row::RowError;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: i64,
        firstname: String,
    }

    impl FromRow for User {
        fn from_row(row: &Row) -> Result<Self, RowError> {
            Ok(User {
                id: row.try_get("id")?,
                firstname: row.try_get("firstname")?,
            })
        }
    }

    impl Record for User {
        const NAME: &'static str = "User";
        const FIELDS: &'static [&'static str] = &["id", "firstname"];
    }

    /// Returns the same rows for every query and records what was sent.
    #[derive(Default)]
    struct Recorder {
        rows: Vec<Row>,
        calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl Recorder {
        fn with_users(users: &[(i64, &str)]) -> Self {
            Self {
                rows: users
                    .iter()
                    .map(|(id, name)| {
                        Row::from_pairs([("id", Value::from(*id)), ("firstname", Value::from(*name))])
                    })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<Value>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Executor for Recorder {
        fn execute(&self, query: &str, params: &[Value]) -> Result<u64, ExecError> {
            self.calls.lock().unwrap().push((query.to_string(), params.to_vec()));
            Ok(0)
        }

        fn query_all(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, ExecError> {
            self.calls.lock().unwrap().push((query.to_string(), params.to_vec()));
            Ok(self.rows.clone())
        }
    }

    fn contract() -> ContractDescriptor {
        ContractDescriptor::new("UserDao")
            .method(MethodDescriptor::new("findById", ReturnType::record::<User>()).param("id"))
            .method(
                MethodDescriptor::new("findByFirstName", ReturnType::collection_of::<User>())
                    .param("firstname"),
            )
            .method(
                MethodDescriptor::new("search", ReturnType::collection_of::<User>())
                    .param("pattern")
                    .sql("select * from user where firstname like ?"),
            )
            .method(MethodDescriptor::new("save", ReturnType::record::<User>()))
            .method(MethodDescriptor::new("findByName", ReturnType::other("String")))
    }

    #[test]
    fn test_single_zero_rows_is_none() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::default());
        let found = dispatcher.find_one::<User>("findById", &[Value::from(42i64)]).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_single_one_row_maps() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(17, "first")]));
        let found = dispatcher.find_one::<User>("findById", &[Value::from(17i64)]).unwrap();
        assert_eq!(found, Some(User { id: 17, firstname: "first".to_string() }));

        let calls = dispatcher.executor().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "select * from User where 1=1 and Id = ?");
        assert_eq!(calls[0].1, vec![Value::from(17i64)]);
    }

    #[test]
    fn test_single_many_rows_is_execution_error() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(1, "a"), (2, "b")]));
        let err = dispatcher.find_one::<User>("findById", &[Value::from(1i64)]).unwrap_err();
        assert!(matches!(err, DaoError::Execution(ExecError::MultipleRows { count: 2 })));
    }

    #[test]
    fn test_sequence_empty_is_empty_vec() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::default());
        let found = dispatcher
            .find_many::<User>("findByFirstName", &[Value::from("nix")])
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_sequence_preserves_store_order() {
        let dispatcher =
            Dispatcher::bind(&contract(), Recorder::with_users(&[(3, "c"), (1, "a"), (2, "b")]));
        let found = dispatcher.find_many::<User>("findByFirstName", &[Value::from("x")]).unwrap();
        assert_eq!(found.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_explicit_query_sent_verbatim() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(1, "a")]));
        dispatcher.find_many::<User>("search", &[Value::from("%a%")]).unwrap();
        let calls = dispatcher.executor().calls();
        assert_eq!(calls[0].0, "select * from user where firstname like ?");
        assert_eq!(calls[0].1, vec![Value::from("%a%")]);
    }

    #[test]
    fn test_rejections_never_reach_store() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(1, "a")]));

        let err = dispatcher.invoke("save", &[]).unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedMethod { ref method, .. } if method == "save"));

        let err = dispatcher.invoke("findByName", &[Value::from("a")]).unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedReturnType { ref declared, .. } if declared == "String"));

        let err = dispatcher.invoke("deleteAll", &[]).unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedMethod { ref reason, .. } if reason.contains("not declared")));

        assert!(dispatcher.executor().calls().is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_rejected_before_store() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(1, "a")]));
        let err = dispatcher.find_many::<User>("findById", &[Value::from(1i64)]).unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedReturnType { .. }));
        assert!(dispatcher.executor().calls().is_empty());
    }

    mod audit {
        use super::*;

        /// Same simple name as the outer `User`, different columns.
        #[derive(Debug)]
        pub struct User {
            pub id: i64,
        }

        impl FromRow for User {
            fn from_row(row: &Row) -> Result<Self, RowError> {
                Ok(User { id: row.try_get("id")? })
            }
        }

        impl Record for User {
            const NAME: &'static str = "User";
            const FIELDS: &'static [&'static str] = &["id"];
        }
    }

    #[test]
    fn test_same_name_other_record_is_rejected() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(1, "a")]));
        let err = dispatcher
            .find_one::<audit::User>("findById", &[Value::from(1i64)])
            .unwrap_err();
        assert!(matches!(err, DaoError::UnsupportedReturnType { .. }));
        assert!(dispatcher.executor().calls().is_empty());
    }

    #[test]
    fn test_mapping_error() {
        let rows = vec![Row::from_pairs([("id", Value::from(1i64))])];
        let dispatcher = Dispatcher::bind(&contract(), Recorder { rows, ..Recorder::default() });
        let err = dispatcher.find_one::<User>("findById", &[Value::from(1i64)]).unwrap_err();
        assert!(matches!(
            err,
            DaoError::Mapping { ref source, .. } if *source == RowError::MissingColumn("firstname".to_string())
        ));
    }

    #[test]
    fn test_invoke_returns_raw_rows() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::with_users(&[(1, "a")]));
        match dispatcher.invoke("findById", &[Value::from(1i64)]).unwrap() {
            Dispatched::Single(Some(row)) => assert_eq!(row.try_get::<i64>("id"), Ok(1)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_first_declaration_wins() {
        let descriptor = ContractDescriptor::new("Dup")
            .method(MethodDescriptor::new("findById", ReturnType::record::<User>()))
            .method(MethodDescriptor::new("findById", ReturnType::other("i64")));
        let dispatcher = Dispatcher::bind(&descriptor, Recorder::default());
        assert_eq!(dispatcher.plan("findById").unwrap().shape(), ResultShape::Single);
    }

    #[test]
    fn test_rejection_for_planned_method() {
        let dispatcher = Dispatcher::bind(&contract(), Recorder::default());
        assert!(matches!(dispatcher.rejection("save"), DaoError::UnsupportedMethod { .. }));
        assert!(matches!(
            dispatcher.rejection("findById"),
            DaoError::UnsupportedReturnType { .. }
        ));
    }

    #[test]
    fn test_dispatcher_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher<Recorder>>();
        assert_send_sync::<Dao<dyn Send, Recorder>>();
    }
}
