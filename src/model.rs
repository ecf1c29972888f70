//! Records: typed rows that contracts return.
//!
//! A record's table is its own simple type name and its columns are its field
//! names. `#[derive(Record)]` implements both traits below.

use crate::row::{Row, RowError};

/// Trait for types that can be created from a database row
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, RowError>;
}

/// A row-backed record type.
///
/// ```rust
/// use dwimdao::{Record, Row, Value};
///
/// #[derive(Debug, PartialEq, Record)]
/// struct User {
///     id: i64,
///     firstname: String,
/// }
///
/// assert_eq!(<User as Record>::NAME, "User");
/// assert_eq!(<User as Record>::FIELDS, &["id", "firstname"]);
///
/// let row = Row::from_pairs([("id", Value::from(1i64)), ("firstname", Value::from("a"))]);
/// let user = <User as dwimdao::FromRow>::from_row(&row).unwrap();
/// assert_eq!(user, User { id: 1, firstname: "a".to_string() });
/// ```
pub trait Record: FromRow {
    /// Simple type name; doubles as the table name of inferred queries.
    const NAME: &'static str;
    /// Field names, in declaration order.
    const FIELDS: &'static [&'static str];

    fn record_type() -> RecordType {
        RecordType::new(Self::NAME, Self::FIELDS)
    }
}

/// Runtime description of a [`Record`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordType {
    name: &'static str,
    fields: &'static [&'static str],
}

impl RecordType {
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    /// The simple name, used verbatim as the table name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }
}
