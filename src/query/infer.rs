//! Finder query inference.
//!
//! `findByFirstNameAndSecondName` on record `User` becomes
//! `select * from User where 1=1 and FirstName = ? and SecondName = ?`,
//! binding arguments in token order. Tokens are taken as written; nothing here
//! checks them against real columns, the store does that when it runs the query.

use crate::model::RecordType;
use std::fmt;

/// Method names must start with this to be inferred.
pub const FINDER_PREFIX: &str = "findBy";

/// Separates field tokens after the prefix.
pub const TOKEN_SEPARATOR: &str = "And";

/// Bind parameter syntax of a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Placeholders {
    /// `?` for every parameter (SQLite, JDBC-style)
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
}

/// Why a method name cannot be turned into a finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferError {
    /// The name does not start with `findBy`
    MissingPrefix,
    /// A field token is empty: bare `findBy`, a leading `And`, or `AndAnd` between tokens
    EmptyToken { position: usize },
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::MissingPrefix => {
                write!(f, "method name does not start with `{FINDER_PREFIX}`")
            }
            InferError::EmptyToken { position } => {
                write!(f, "field token {position} after `{FINDER_PREFIX}` is empty")
            }
        }
    }
}

impl std::error::Error for InferError {}

/// A parameterized select over one table with a conjunction of equality predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FinderQuery {
    table: String,
    columns: Vec<String>,
}

impl FinderQuery {
    /// Select from `table` filtered by `column = ?` for each column, in order.
    ///
    /// No columns means a plain table scan.
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Columns in the order their arguments must be bound.
    pub fn bind_order(&self) -> &[String] {
        &self.columns
    }

    pub fn predicate_count(&self) -> usize {
        self.columns.len()
    }

    /// Render the query text.
    ///
    /// ```rust
    /// use dwimdao::{FinderQuery, Placeholders};
    ///
    /// let q = FinderQuery::new("User", vec!["FirstName".into(), "SecondName".into()]);
    /// assert_eq!(
    ///     q.to_sql(Placeholders::Question),
    ///     "select * from User where 1=1 and FirstName = ? and SecondName = ?"
    /// );
    /// assert_eq!(
    ///     q.to_sql(Placeholders::Numbered),
    ///     "select * from User where 1=1 and FirstName = $1 and SecondName = $2"
    /// );
    /// ```
    pub fn to_sql(&self, placeholders: Placeholders) -> String {
        let mut sql = format!("select * from {} where 1=1", self.table);
        for (idx, column) in self.columns.iter().enumerate() {
            match placeholders {
                Placeholders::Question => sql.push_str(&format!(" and {column} = ?")),
                Placeholders::Numbered => {
                    sql.push_str(&format!(" and {column} = ${}", idx + 1));
                }
            }
        }
        sql
    }
}

impl fmt::Display for FinderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql(Placeholders::Question))
    }
}

/// Derive the finder query for `method_name` over `record`.
///
/// # Errors
///
/// [`InferError::MissingPrefix`] for names not starting with `findBy`,
/// [`InferError::EmptyToken`] for a bare `findBy` or an empty leading or
/// interior token. Trailing empty tokens are dropped.
pub fn infer(method_name: &str, record: &RecordType) -> Result<FinderQuery, InferError> {
    let suffix = method_name
        .strip_prefix(FINDER_PREFIX)
        .ok_or(InferError::MissingPrefix)?;

    let mut columns: Vec<String> = suffix.split(TOKEN_SEPARATOR).map(str::to_owned).collect();
    // trailing separators add nothing: `findByNameAnd` is `findByName`
    while columns.len() > 1 && columns.last().is_some_and(String::is_empty) {
        columns.pop();
    }
    if let Some(position) = columns.iter().position(String::is_empty) {
        return Err(InferError::EmptyToken { position });
    }

    Ok(FinderQuery::new(record.name(), columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Word;
    use fake::Fake;

    const USER: RecordType = RecordType::new("User", &["id", "firstname", "secondname"]);

    fn capitalize(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    #[test]
    fn test_single_token() {
        let q = infer("findById", &USER).unwrap();
        assert_eq!(q.table(), "User");
        assert_eq!(q.bind_order(), &["Id".to_string()]);
        assert_eq!(q.to_string(), "select * from User where 1=1 and Id = ?");
    }

    #[test]
    fn test_two_tokens_preserve_case_and_order() {
        let q = infer("findByFirstNameAndSecondName", &USER).unwrap();
        assert_eq!(
            q.to_sql(Placeholders::Question),
            "select * from User where 1=1 and FirstName = ? and SecondName = ?"
        );
        assert_eq!(q.bind_order(), &["FirstName".to_string(), "SecondName".to_string()]);
    }

    #[test]
    fn test_lowercase_tokens_kept_verbatim() {
        let q = infer("findByfirstname", &USER).unwrap();
        assert_eq!(q.bind_order(), &["firstname".to_string()]);
    }

    #[test]
    fn test_generated_token_sequences() {
        for _ in 0..50 {
            let count: usize = (1..6).fake();
            let tokens: Vec<String> = (0..count)
                .map(|_| capitalize(&Word().fake::<String>()))
                // `And` inside a word would split it; keep generated tokens clean
                .map(|t| t.replace("And", "Xnd"))
                .collect();
            let name = format!("findBy{}", tokens.join("And"));

            let q = infer(&name, &USER).unwrap();
            assert_eq!(q.predicate_count(), count, "{name}");
            assert_eq!(q.bind_order(), tokens.as_slice(), "{name}");
            assert_eq!(q.to_sql(Placeholders::Question).matches(" = ?").count(), count);
        }
    }

    #[test]
    fn test_missing_prefix() {
        assert_eq!(infer("save", &USER), Err(InferError::MissingPrefix));
        assert_eq!(infer("findById".to_lowercase().as_str(), &USER), Err(InferError::MissingPrefix));
        assert_eq!(infer("getById", &USER), Err(InferError::MissingPrefix));
    }

    #[test]
    fn test_bare_prefix_rejected() {
        assert_eq!(infer("findBy", &USER), Err(InferError::EmptyToken { position: 0 }));
    }

    #[test]
    fn test_trailing_separators_dropped() {
        let q = infer("findByFirstNameAnd", &USER).unwrap();
        assert_eq!(q.to_string(), "select * from User where 1=1 and FirstName = ?");
        let q = infer("findByFirstNameAndSecondNameAndAnd", &USER).unwrap();
        assert_eq!(q.bind_order(), &["FirstName".to_string(), "SecondName".to_string()]);
    }

    #[test]
    fn test_leading_and_interior_empty_tokens_rejected() {
        assert_eq!(infer("findByAAndAndB", &USER), Err(InferError::EmptyToken { position: 1 }));
        assert_eq!(infer("findByAndName", &USER), Err(InferError::EmptyToken { position: 0 }));
        assert_eq!(infer("findByAnd", &USER), Err(InferError::EmptyToken { position: 0 }));
    }

    #[test]
    fn test_separator_is_case_sensitive() {
        let q = infer("findByBrandandModel", &USER).unwrap();
        assert_eq!(q.bind_order(), &["BrandandModel".to_string()]);
    }

    #[test]
    fn test_table_scan_without_columns() {
        let q = FinderQuery::new("User", Vec::new());
        assert_eq!(q.predicate_count(), 0);
        assert_eq!(q.to_sql(Placeholders::Numbered), "select * from User where 1=1");
    }

    #[test]
    fn test_numbered_placeholders() {
        let q = infer("findByAAndBAndC", &USER).unwrap();
        assert_eq!(
            q.to_sql(Placeholders::Numbered),
            "select * from User where 1=1 and A = $1 and B = $2 and C = $3"
        );
    }

    #[test]
    fn test_infer_error_display() {
        assert!(InferError::MissingPrefix.to_string().contains("findBy"));
        assert!(InferError::EmptyToken { position: 2 }.to_string().contains('2'));
    }
}
