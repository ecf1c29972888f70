//! Contract descriptors.
//!
//! A contract is a set of data-access method signatures with no bodies. The
//! `#[dao]` attribute builds a [`ContractDescriptor`] from a trait; descriptors
//! can also be assembled by hand for use with [`Dispatcher`](crate::Dispatcher).

use crate::model::{Record, RecordType};
use std::fmt;

/// Declared return type of a contract method, as far as dispatch cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// A single record (declared as `Option<R>` in Rust contracts).
    Record(RecordType),
    /// A container of some element type (declared as `Vec<_>`).
    Collection(Box<ReturnType>),
    /// Anything else, by its written name.
    Other(String),
}

impl ReturnType {
    pub fn record<R: Record>() -> Self {
        ReturnType::Record(R::record_type())
    }

    pub fn collection_of<R: Record>() -> Self {
        ReturnType::Collection(Box::new(ReturnType::record::<R>()))
    }

    pub fn other(name: impl Into<String>) -> Self {
        ReturnType::Other(name.into())
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Record(rt) => write!(f, "{}", rt.name()),
            ReturnType::Collection(inner) => write!(f, "Collection<{inner}>"),
            ReturnType::Other(name) => f.write_str(name),
        }
    }
}

/// One method of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<String>,
    return_type: ReturnType,
    sql: Option<String>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, return_type: ReturnType) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type,
            sql: None,
        }
    }

    /// Append a parameter name. Parameters bind positionally in this order.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Attach an explicit query; it replaces inference for every call.
    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn return_type(&self) -> &ReturnType {
        &self.return_type
    }

    pub fn explicit_sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }
}

/// A whole contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    name: String,
    methods: Vec<MethodDescriptor>,
}

impl ContractDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// First method declared under `name`.
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Implemented by `#[dao]` for `dyn Trait`.
pub trait Contract {
    fn descriptor() -> ContractDescriptor;
}
