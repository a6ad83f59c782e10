//! Concrete entity type built at schema load.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashMap;

use super::{EdgeDescriptor, EntitySchema, FieldDescriptor};
use crate::errors::Error;

/// An entity type: a name plus ordered field and edge declarations.
///
/// Name lookups are hashed, so resolving a field or edge is O(1).
///
/// # Example
///
/// ```
/// use graph_changeset::{EdgeDescriptor, EntitySchema, EntityType, FieldDescriptor, FieldKind};
///
/// let location = EntityType::builder("Location")
///     .field(FieldDescriptor::new("name", FieldKind::String))
///     .field(FieldDescriptor::new("latitude", FieldKind::Float))
///     .edge(EdgeDescriptor::to_one("parent", "Location"))
///     .edge(EdgeDescriptor::to_many("children", "Location"))
///     .build()
///     .unwrap();
///
/// assert_eq!(location.name(), "Location");
/// assert_eq!(location.field_index("latitude"), Some(1));
/// assert!(location.edge("parent").unwrap().is_to_one());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    fields: Vec<FieldDescriptor>,
    edges: Vec<EdgeDescriptor>,
    field_lookup: HashMap<String, usize>,
    edge_lookup: HashMap<String, usize>,
}

impl EntityType {
    /// Starts declaring an entity type.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl EntitySchema for EntityType {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    fn edges(&self) -> &[EdgeDescriptor] {
        &self.edges
    }

    #[inline]
    fn field_index(&self, name: &str) -> Option<usize> {
        self.field_lookup.get(name).copied()
    }

    #[inline]
    fn edge_index(&self, name: &str) -> Option<usize> {
        self.edge_lookup.get(name).copied()
    }
}

/// Builder for [`EntityType`].
#[derive(Debug, Clone)]
pub struct EntityTypeBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    edges: Vec<EdgeDescriptor>,
}

impl EntityTypeBuilder {
    /// Appends a field declaration.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends an edge declaration.
    #[must_use]
    pub fn edge(mut self, edge: EdgeDescriptor) -> Self {
        self.edges.push(edge);
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// * `DuplicateField` - If two fields share a name.
    /// * `DuplicateEdge` - If two edges share a name.
    ///
    pub fn build(self) -> Result<EntityType, Error> {
        let mut field_lookup = HashMap::with_capacity(self.fields.len());
        for (idx, field) in self.fields.iter().enumerate() {
            if field_lookup.insert(field.name().to_string(), idx).is_some() {
                return Err(Error::DuplicateField {
                    entity: self.name,
                    field: field.name().to_string(),
                });
            }
        }

        let mut edge_lookup = HashMap::with_capacity(self.edges.len());
        for (idx, edge) in self.edges.iter().enumerate() {
            if edge_lookup.insert(edge.name().to_string(), idx).is_some() {
                return Err(Error::DuplicateEdge {
                    entity: self.name,
                    edge: edge.name().to_string(),
                });
            }
        }

        Ok(EntityType {
            name: self.name,
            fields: self.fields,
            edges: self.edges,
            field_lookup,
            edge_lookup,
        })
    }
}
