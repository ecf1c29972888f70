//! Span constructors shared by dispatch and the executors.

use tracing::Span;

/// Span around one contract method invocation.
pub fn dispatch_span(contract: &str, method: &str) -> Span {
    tracing::debug_span!("dwimdao.dispatch", contract, method)
}

/// Span around one statement sent to the store.
pub fn execute_query_span(query: &str) -> Span {
    tracing::debug_span!("dwimdao.query", db.statement = query)
}
