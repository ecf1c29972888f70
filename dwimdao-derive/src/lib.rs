//! Procedural macros for dwimdao
//!
//! This crate provides the `Record` derive and the `#[dao]` contract attribute.

mod attributes;
mod macros;
mod types;

use proc_macro::TokenStream;

/// Derive macro for `Record` - generates `FromRow` and `Record` implementations
///
/// The record's name is the struct's simple name and its columns are the field
/// names. `#[column_name = "..."]` overrides the column a field is read from.
///
/// ```ignore
/// #[derive(Record)]
/// pub struct User {
///     pub id: i64,
///     pub firstname: String,
///     #[column_name = "secondname"]
///     pub surname: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(column_name))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    macros::derive_record(input)
}

/// Attribute macro for contract traits
///
/// Keeps the trait as written and generates:
/// - `Contract` for `dyn Trait` (the method descriptors)
/// - the trait itself for `Dao<dyn Trait, E>`, dispatching every method
///
/// Methods must take `&self`, have no generic parameters and return
/// `Result<Option<R>, E>` (one record), `Result<Vec<R>, E>` (many), or anything
/// else wrapped in `Result`, which fails with `UnsupportedReturnType` when
/// called. `E` must be constructible from `DaoError` via `Into`. Methods with a
/// default body are left alone.
///
/// `#[sql = "..."]` (or `#[sql("...")]`) on a method replaces query inference.
#[proc_macro_attribute]
pub fn dao(args: TokenStream, input: TokenStream) -> TokenStream {
    macros::expand_dao(args, input)
}
