//! Converted parameter values.
//!
//! Raw command-line strings are converted into [`Value`]s by the binder. Verb
//! bodies read them back as native Rust types through [`FromValue`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A typed parameter value produced by conversion.
///
/// # Examples
///
/// ```
/// use verb_dispatch_core::{FromValue, Value};
///
/// let v = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
/// assert_eq!(Vec::<i64>::from_value(&v).unwrap(), vec![1, 2]);
/// assert_eq!(Option::<i64>::from_value(&Value::Absent).unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean switch.
    Bool(bool),
    /// Occurrence count of a counter option.
    Count(usize),
    /// Free-form text.
    String(String),
    /// Signed integer.
    Integer(i64),
    /// Unsigned integer.
    Unsigned(u64),
    /// Floating-point number.
    Float(f64),
    /// Single character.
    Char(char),
    /// Filesystem path.
    Path(PathBuf),
    /// One of a fixed set of choices (stored in its declared spelling).
    Choice(String),
    /// Union of bit flags; bit `i` is the `i`-th declared flag name.
    Flags(u64),
    /// Ordered collection.
    List(Vec<Value>),
    /// Optional parameter that received nothing and has no default.
    Absent,
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Count(_) => "count",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Unsigned(_) => "unsigned",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Path(_) => "path",
            Self::Choice(_) => "choice",
            Self::Flags(_) => "flags",
            Self::List(_) => "list",
            Self::Absent => "absent",
        }
    }

    /// Returns `true` for [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Failure to read an invocation argument as a native type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The verb declares no parameter with that name.
    #[error("no parameter named '{0}'")]
    UnknownParameter(String),
    /// The value has a different type than requested.
    #[error("parameter '{name}' holds a {found}, not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The slot holds a service rather than a value.
    #[error("slot {0} does not hold a value")]
    NotAValue(usize),
}

/// Conversion from a [`Value`] into a native Rust type.
///
/// Returns the found variant name on mismatch.
pub trait FromValue: Sized {
    /// Human-readable name of the target type.
    const EXPECTED: &'static str;

    /// Extracts `Self` from `value`.
    fn from_value(value: &Value) -> Result<Self, &'static str>;
}

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Integer(i) => Ok(*i),
            Value::Unsigned(u) => i64::try_from(*u).map_err(|_| "unsigned"),
            Value::Count(c) => i64::try_from(*c).map_err(|_| "count"),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for u64 {
    const EXPECTED: &'static str = "unsigned";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Unsigned(u) | Value::Flags(u) => Ok(*u),
            Value::Count(c) => Ok(*c as u64),
            Value::Integer(i) => u64::try_from(*i).map_err(|_| "integer"),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for usize {
    const EXPECTED: &'static str = "count";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Count(c) => Ok(*c),
            Value::Unsigned(u) => usize::try_from(*u).map_err(|_| "unsigned"),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            Value::Unsigned(u) => Ok(*u as f64),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for char {
    const EXPECTED: &'static str = "char";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Char(c) => Ok(*c),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::String(s) | Value::Choice(s) => Ok(s.clone()),
            Value::Path(p) => Ok(p.display().to_string()),
            other => Err(other.type_name()),
        }
    }
}

impl FromValue for PathBuf {
    const EXPECTED: &'static str = "path";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Path(p) => Ok(p.clone()),
            Value::String(s) => Ok(PathBuf::from(s)),
            other => Err(other.type_name()),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => Err(other.type_name()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Result<Self, &'static str> {
        match value {
            Value::Absent => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
