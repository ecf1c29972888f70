//! Dispatch errors.

use crate::executor::ExecError;
use crate::row::RowError;
use std::fmt;

/// Error returned by every dispatched contract method.
///
/// "Not found" is never an error: a single-record method returns `None` and a
/// sequence method returns an empty `Vec`.
#[derive(Debug)]
pub enum DaoError {
    /// The method neither carries an explicit query nor has an inferable name
    UnsupportedMethod { method: String, reason: String },
    /// The declared return type is neither a record nor a collection of records
    UnsupportedReturnType { method: String, declared: String },
    /// The store rejected or failed the query (including too many rows for a single record)
    Execution(ExecError),
    /// A returned row could not be mapped into the record type
    Mapping {
        method: String,
        source: RowError,
    },
}

impl DaoError {
    /// Whether the call was rejected before touching the store.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DaoError::UnsupportedMethod { .. } | DaoError::UnsupportedReturnType { .. }
        )
    }
}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::UnsupportedMethod { method, reason } => {
                write!(f, "Unsupported method {method}: {reason}")
            }
            DaoError::UnsupportedReturnType { method, declared } => {
                write!(f, "Unsupported return type {declared} of method {method}")
            }
            DaoError::Execution(e) => write!(f, "{e}"),
            DaoError::Mapping { method, source } => {
                write!(f, "Failed to map row returned by {method}: {source}")
            }
        }
    }
}

impl std::error::Error for DaoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DaoError::Execution(e) => Some(e),
            DaoError::Mapping { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExecError> for DaoError {
    fn from(err: ExecError) -> Self {
        DaoError::Execution(err)
    }
}

/// Bind-time verdict on a method that can never dispatch, replayed on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    UnsupportedMethod { method: String, reason: String },
    UnsupportedReturnType { method: String, declared: String },
}

impl From<Rejection> for DaoError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::UnsupportedMethod { method, reason } => {
                DaoError::UnsupportedMethod { method, reason }
            }
            Rejection::UnsupportedReturnType { method, declared } => {
                DaoError::UnsupportedReturnType { method, declared }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DaoError::UnsupportedMethod {
            method: "save".to_string(),
            reason: "no query".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported method save: no query");

        let err = DaoError::from(ExecError::QueryError("boom".to_string()));
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_rejection_conversion() {
        let err: DaoError = Rejection::UnsupportedReturnType {
            method: "countAll".to_string(),
            declared: "i64".to_string(),
        }
        .into();
        assert!(err.is_rejection());
        assert!(matches!(err, DaoError::UnsupportedReturnType { ref declared, .. } if declared == "i64"));
    }
}
