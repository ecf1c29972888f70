//! Query inference and backend value conversion.
//!
//! # Architecture
//!
//! - **Infer**: method name + record type to a parameterized select (`FinderQuery`)
//! - **Value Conversion**: `sea_query::Value` binds and `may_postgres` rows

// Finder query inference
pub mod infer;
#[doc(inline)]
pub use infer::{infer, FinderQuery, InferError, Placeholders, FINDER_PREFIX, TOKEN_SEPARATOR};

// Value conversion utilities
pub(crate) mod value_conversion;
