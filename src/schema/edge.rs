//! Edge declarations.

use alloc::string::String;

/// Whether an edge reaches at most one target or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cardinality {
    /// At most one target; attaching a new target replaces the pending one.
    One,
    /// Any number of targets.
    Many,
}

/// Declaration of one edge of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeDescriptor {
    name: String,
    target: String,
    cardinality: Cardinality,
    unique: bool,
}

impl EdgeDescriptor {
    /// Declares an edge to at most one node of type `target`.
    #[must_use]
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::One,
            unique: true,
        }
    }

    /// Declares an edge to any number of nodes of type `target`.
    #[must_use]
    pub fn to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::Many,
            unique: false,
        }
    }

    /// Marks every target as reachable from at most one source
    /// (one-to-many rather than many-to-many).
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The edge name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target entity type name.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The edge cardinality.
    #[inline]
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Whether the edge reaches at most one target.
    #[inline]
    #[must_use]
    pub fn is_to_one(&self) -> bool {
        self.cardinality == Cardinality::One
    }

    /// Whether targets are unique to one source.
    #[inline]
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }
}
