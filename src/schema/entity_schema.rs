//! Runtime entity schema trait.
use alloc::sync::Arc;
use core::fmt::Debug;

use super::{EdgeDescriptor, FieldDescriptor};

/// The field and edge declarations of one entity type.
///
/// A mutation is parameterized by an implementor of this trait and never
/// outlives it. Declarations are read-only after construction, so one schema
/// can back any number of mutations concurrently.
pub trait EntitySchema: Debug + Clone {
    /// The entity type name.
    fn name(&self) -> &str;

    /// Declared fields, in declaration order.
    fn fields(&self) -> &[FieldDescriptor];

    /// Declared edges, in declaration order.
    fn edges(&self) -> &[EdgeDescriptor];

    /// Returns the declaration index of the field named `name`.
    ///
    /// The default scans [`fields`](Self::fields); implementors with an index
    /// should override it.
    fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|f| f.name() == name)
    }

    /// Returns the declaration index of the edge named `name`.
    fn edge_index(&self, name: &str) -> Option<usize> {
        self.edges().iter().position(|e| e.name() == name)
    }

    /// Returns the declaration of the field named `name`.
    fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.field_index(name).map(|idx| &self.fields()[idx])
    }

    /// Returns the declaration of the edge named `name`.
    fn edge(&self, name: &str) -> Option<&EdgeDescriptor> {
        self.edge_index(name).map(|idx| &self.edges()[idx])
    }
}

impl<T: EntitySchema> EntitySchema for &T {
    #[inline]
    fn name(&self) -> &str {
        T::name(self)
    }

    #[inline]
    fn fields(&self) -> &[FieldDescriptor] {
        T::fields(self)
    }

    #[inline]
    fn edges(&self) -> &[EdgeDescriptor] {
        T::edges(self)
    }

    #[inline]
    fn field_index(&self, name: &str) -> Option<usize> {
        T::field_index(self, name)
    }

    #[inline]
    fn edge_index(&self, name: &str) -> Option<usize> {
        T::edge_index(self, name)
    }
}

impl<T: EntitySchema> EntitySchema for Arc<T> {
    #[inline]
    fn name(&self) -> &str {
        T::name(self)
    }

    #[inline]
    fn fields(&self) -> &[FieldDescriptor] {
        T::fields(self)
    }

    #[inline]
    fn edges(&self) -> &[EdgeDescriptor] {
        T::edges(self)
    }

    #[inline]
    fn field_index(&self, name: &str) -> Option<usize> {
        T::field_index(self, name)
    }

    #[inline]
    fn edge_index(&self, name: &str) -> Option<usize> {
        T::edge_index(self, name)
    }
}
