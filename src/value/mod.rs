//! Value extraction for dwimdao rows
//!
//! Bind arguments and row cells are both `sea_query::Value`s. This module turns
//! cells back into Rust types.

pub mod try_getable;

pub use try_getable::{is_null, TryGetable, ValueExtractionError};
