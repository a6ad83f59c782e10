//! Values carried by pending field changes, and node identifiers.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Identifier of a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id(pub i64);

impl From<i64> for Id {
    #[inline]
    fn from(id: i64) -> Self {
        Id(id)
    }
}

impl From<i32> for Id {
    #[inline]
    fn from(id: i32) -> Self {
        Id(i64::from(id))
    }
}

impl From<Id> for i64 {
    #[inline]
    fn from(id: Id) -> Self {
        id.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A field value.
///
/// Each variant matches one [`FieldKind`](crate::FieldKind); the field store
/// rejects values whose variant does not match the declared kind.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// IEEE 754 floating point.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Instant as nanoseconds since the Unix epoch.
    Time(i64),
    /// One variant of an enum field.
    Enum(String),
    /// List of strings.
    Strings(Vec<String>),
    /// Raw JSON document.
    Json(String),
}

impl Value {
    /// Returns the name of the kind of this value, as used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Time(_) => "time",
            Value::Enum(_) => "enum",
            Value::Strings(_) => "strings",
            Value::Json(_) => "json",
        }
    }

    /// Returns the integer payload, if any.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if any.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload of string, enum and JSON values.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Enum(v) | Value::Json(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Adds two numeric deltas of the same kind.
    ///
    /// Integer deltas saturate instead of overflowing.
    pub(crate) fn accumulate(&self, rhs: &Value) -> Option<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.saturating_add(*b))),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(a + b)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) | (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b))
            | (Value::Enum(a), Value::Enum(b))
            | (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Strings(a), Value::Strings(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) | Value::Time(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) | Value::Enum(v) | Value::Json(v) => write!(f, "{v:?}"),
            Value::Strings(v) => write!(f, "{v:?}"),
        }
    }
}

// From implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Strings(v)
    }
}

impl From<Id> for Value {
    fn from(v: Id) -> Self {
        Value::Int(v.0)
    }
}

// Arbitrary implementations for testing
#[cfg(feature = "testing")]
mod arbitrary_impl {
    use super::{Id, Value};
    use arbitrary::{Arbitrary, Unstructured};

    impl<'a> Arbitrary<'a> for Id {
        fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
            Ok(Id(u.arbitrary()?))
        }
    }

    impl<'a> Arbitrary<'a> for Value {
        fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
            Ok(match u.int_in_range(0..=7)? {
                0 => Value::Bool(u.arbitrary()?),
                1 => Value::Int(u.int_in_range(-1000..=1000)?),
                2 => Value::Float(u.arbitrary()?),
                3 => Value::String(u.arbitrary()?),
                4 => Value::Time(u.arbitrary()?),
                5 => Value::Enum((*u.choose(&["DRAFT", "LIVE", "RETIRED"])?).into()),
                6 => Value::Strings(u.arbitrary()?),
                _ => Value::Json(u.arbitrary()?),
            })
        }
    }
}
