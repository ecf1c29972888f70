//! Per-method dispatch plans, resolved once when a contract is bound.

use super::error::Rejection;
use crate::contract::{MethodDescriptor, ReturnType};
use crate::model::RecordType;
use crate::query::{infer, InferError, Placeholders, FINDER_PREFIX};

/// How many records a method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    /// At most one record; no row means `None`
    Single,
    /// Any number of records, in store order
    Sequence,
}

impl ResultShape {
    /// Shape and record type of a declared return type, if it has one.
    pub fn resolve(return_type: &ReturnType) -> Option<(ResultShape, RecordType)> {
        match return_type {
            ReturnType::Record(record) => Some((ResultShape::Single, *record)),
            ReturnType::Collection(element) => match element.as_ref() {
                ReturnType::Record(record) => Some((ResultShape::Sequence, *record)),
                _ => None,
            },
            ReturnType::Other(_) => None,
        }
    }
}

/// Where a plan's query text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuerySource {
    Explicit,
    Inferred,
}

/// Everything needed to run one contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    sql: String,
    shape: ResultShape,
    record: RecordType,
    source: QuerySource,
}

impl Plan {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }

    pub fn record(&self) -> RecordType {
        self.record
    }

    pub fn source(&self) -> QuerySource {
        self.source
    }
}

/// Resolve `method` for an executor using `placeholders`.
///
/// Name eligibility is judged before the return type, so `save` is an
/// unsupported method whatever it returns.
pub(crate) fn plan(method: &MethodDescriptor, placeholders: Placeholders) -> Result<Plan, Rejection> {
    let name = method.name();
    let explicit = method.explicit_sql();

    if explicit.is_none() && !name.starts_with(FINDER_PREFIX) {
        return Err(Rejection::UnsupportedMethod {
            method: name.to_string(),
            reason: format!("no explicit query and name does not start with `{FINDER_PREFIX}`"),
        });
    }

    let (shape, record) = ResultShape::resolve(method.return_type()).ok_or_else(|| {
        Rejection::UnsupportedReturnType {
            method: name.to_string(),
            declared: method.return_type().to_string(),
        }
    })?;

    let (sql, source) = match explicit {
        Some(sql) => (sql.to_string(), QuerySource::Explicit),
        None => {
            let query = infer(name, &record).map_err(|e: InferError| Rejection::UnsupportedMethod {
                method: name.to_string(),
                reason: e.to_string(),
            })?;
            (query.to_sql(placeholders), QuerySource::Inferred)
        }
    };

    Ok(Plan {
        sql,
        shape,
        record,
        source,
    })
}
