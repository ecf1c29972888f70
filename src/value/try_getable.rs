//! TryGetable trait for safe value extraction
//!
//! Rows handed back by executors carry `sea_query::Value`s whose variant depends
//! on the backend (SQLite only knows 64-bit integers and doubles, PostgreSQL
//! reports the declared column type). Extraction therefore accepts any integer
//! variant for integer targets and checks the range instead of the variant.

use sea_query::Value;

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null (None variant)
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch {
        expected: String,
        actual: String,
    },
    /// Value conversion failed (e.g., overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {expected}, got {actual}")
            }
            ValueExtractionError::ConversionError(msg) => {
                write!(f, "Conversion error: {msg}")
            }
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// Trait for safe value extraction with error handling
///
/// ```rust
/// use dwimdao::{TryGetable, ValueExtractionError};
/// use sea_query::Value;
///
/// let value = Value::BigInt(Some(42));
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(value);
/// assert_eq!(result, Ok(42));
///
/// let null_value = Value::Int(None);
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(null_value);
/// assert!(matches!(result, Err(ValueExtractionError::NullValue)));
/// ```
pub trait TryGetable: Sized {
    /// Try to extract a value from `sea_query::Value`.
    ///
    /// Returns:
    /// - `Ok(T)` if the value converts to the expected type and is not null
    /// - `Err(ValueExtractionError::NullValue)` if the value is null
    /// - `Err(ValueExtractionError::TypeMismatch)` if the value type doesn't match
    /// - `Err(ValueExtractionError::ConversionError)` if conversion fails (e.g., overflow)
    fn try_get(value: Value) -> Result<Self, ValueExtractionError>;
}

/// Whether `value` is a null of any variant.
pub fn is_null(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(None)
            | Value::TinyInt(None)
            | Value::SmallInt(None)
            | Value::Int(None)
            | Value::BigInt(None)
            | Value::TinyUnsigned(None)
            | Value::SmallUnsigned(None)
            | Value::Unsigned(None)
            | Value::BigUnsigned(None)
            | Value::Float(None)
            | Value::Double(None)
            | Value::String(None)
            | Value::Char(None)
            | Value::Bytes(None)
            | Value::Json(None)
    )
}

fn mismatch(expected: &str, value: &Value) -> ValueExtractionError {
    ValueExtractionError::TypeMismatch {
        expected: expected.to_string(),
        actual: format!("{value:?}"),
    }
}

/// Widen any integer variant to `i128` so range checks are uniform.
fn integer(value: &Value) -> Option<i128> {
    match value {
        Value::TinyInt(Some(v)) => Some(i128::from(*v)),
        Value::SmallInt(Some(v)) => Some(i128::from(*v)),
        Value::Int(Some(v)) => Some(i128::from(*v)),
        Value::BigInt(Some(v)) => Some(i128::from(*v)),
        Value::TinyUnsigned(Some(v)) => Some(i128::from(*v)),
        Value::SmallUnsigned(Some(v)) => Some(i128::from(*v)),
        Value::Unsigned(Some(v)) => Some(i128::from(*v)),
        Value::BigUnsigned(Some(v)) => Some(i128::from(*v)),
        _ => None,
    }
}

macro_rules! impl_try_getable_integer {
    ($($type:ty => $expected:expr),* $(,)?) => {
        $(
            impl TryGetable for $type {
                fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
                    if is_null(&value) {
                        return Err(ValueExtractionError::NullValue);
                    }
                    let wide = integer(&value).ok_or_else(|| mismatch($expected, &value))?;
                    <$type>::try_from(wide).map_err(|_| {
                        ValueExtractionError::ConversionError(format!(
                            "{wide} is out of range for {}",
                            $expected
                        ))
                    })
                }
            }
        )*
    };
}

impl_try_getable_integer!(
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
);

impl TryGetable for f32 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Float(Some(v)) => Ok(v),
            // SQLite reports every REAL as a double
            Value::Double(Some(v)) => Ok(v as f32),
            ref v if is_null(v) => Err(ValueExtractionError::NullValue),
            ref v => Err(mismatch("f32", v)),
        }
    }
}

impl TryGetable for f64 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Double(Some(v)) => Ok(v),
            Value::Float(Some(v)) => Ok(f64::from(v)),
            ref v if is_null(v) => Err(ValueExtractionError::NullValue),
            ref v => Err(mismatch("f64", v)),
        }
    }
}

impl TryGetable for bool {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bool(Some(b)) => Ok(b),
            ref v if is_null(v) => Err(ValueExtractionError::NullValue),
            ref v => match integer(v) {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                Some(other) => Err(ValueExtractionError::ConversionError(format!(
                    "{other} is not a boolean"
                ))),
                None => Err(mismatch("bool", v)),
            },
        }
    }
}

impl TryGetable for String {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::String(Some(s)) => Ok(s),
            Value::Char(Some(c)) => Ok(c.to_string()),
            ref v if is_null(v) => Err(ValueExtractionError::NullValue),
            ref v => Err(mismatch("String", v)),
        }
    }
}

impl TryGetable for Vec<u8> {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Bytes(Some(b)) => Ok(b),
            ref v if is_null(v) => Err(ValueExtractionError::NullValue),
            ref v => Err(mismatch("Bytes", v)),
        }
    }
}

impl<T: TryGetable> TryGetable for Option<T> {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        if is_null(&value) {
            return Ok(None);
        }
        T::try_get(value).map(Some)
    }
}
