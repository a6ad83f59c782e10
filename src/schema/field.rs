//! Field declarations.

use alloc::string::String;

use crate::Value;

/// The declared kind of a field.
///
/// Each kind validates the values it accepts, so the field store never has to
/// know about individual entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FieldKind {
    /// Boolean flag.
    Bool,
    /// Signed integer; accepts deltas.
    Int,
    /// Floating point; accepts deltas.
    Float,
    /// UTF-8 text.
    String,
    /// Instant in Unix nanoseconds.
    Time,
    /// Enumeration restricted to the listed variants.
    Enum(&'static [&'static str]),
    /// List of strings.
    Strings,
    /// JSON document.
    Json,
}

impl FieldKind {
    /// Returns the name of the kind, as used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Float => "float",
            FieldKind::String => "string",
            FieldKind::Time => "time",
            FieldKind::Enum(_) => "enum",
            FieldKind::Strings => "strings",
            FieldKind::Json => "json",
        }
    }

    /// Returns whether the kind accepts numeric deltas.
    #[inline]
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Int | FieldKind::Float)
    }

    /// Returns whether `value` is a valid value for this kind.
    ///
    /// Enum values must name one of the declared variants.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Bool, Value::Bool(_))
            | (FieldKind::Int, Value::Int(_))
            | (FieldKind::Float, Value::Float(_))
            | (FieldKind::String, Value::String(_))
            | (FieldKind::Time, Value::Time(_))
            | (FieldKind::Strings, Value::Strings(_))
            | (FieldKind::Json, Value::Json(_)) => true,
            (FieldKind::Enum(variants), Value::Enum(v)) => variants.contains(&v.as_str()),
            _ => false,
        }
    }
}

/// Declaration of one field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    nullable: bool,
}

impl FieldDescriptor {
    /// Declares a required field.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }

    /// Marks the field as nullable, allowing it to be cleared.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The field name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field may be cleared.
    #[inline]
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether the field accepts numeric deltas.
    #[inline]
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }
}
