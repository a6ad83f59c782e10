//! Process-wide registry of entity types.

use alloc::string::{String, ToString};
use alloc::sync::Arc;

use indexmap::IndexMap as IndexMapRaw;

use super::{EntitySchema, EntityType};
use crate::errors::Error;

/// `IndexMap` alias using hashbrown's default hasher for `no_std` compatibility.
type IndexMap<K, V> = IndexMapRaw<K, V, hashbrown::DefaultHashBuilder>;

/// All entity types known to a client, in registration order.
///
/// The registry is built once at startup and only read afterwards; clients
/// share it behind an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: IndexMap<String, Arc<EntityType>>,
}

impl Schema {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity type.
    ///
    /// # Errors
    ///
    /// * `DuplicateEntityType` - If an entity type with the same name is already registered.
    ///
    pub fn register(&mut self, entity: EntityType) -> Result<&mut Self, Error> {
        let name = entity.name().to_string();
        if self.entities.contains_key(&name) {
            return Err(Error::DuplicateEntityType { entity: name });
        }
        self.entities.insert(name, Arc::new(entity));
        Ok(self)
    }

    /// Builds a registry from a list of entity types.
    ///
    /// # Errors
    ///
    /// * `DuplicateEntityType` - If two entity types share a name.
    ///
    pub fn from_entities(entities: impl IntoIterator<Item = EntityType>) -> Result<Self, Error> {
        let mut schema = Self::new();
        for entity in entities {
            schema.register(entity)?;
        }
        Ok(schema)
    }

    /// Returns the entity type named `name`.
    ///
    /// # Errors
    ///
    /// * `UnknownEntityType` - If no such entity type is registered.
    ///
    pub fn entity(&self, name: &str) -> Result<Arc<EntityType>, Error> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownEntityType {
                entity: name.to_string(),
            })
    }

    /// Iterates over the registered entity type names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.keys().map(String::as_str)
    }

    /// Returns the number of registered entity types.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns whether no entity type is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDescriptor, FieldKind};
    use alloc::vec::Vec;

    fn named(name: &str) -> EntityType {
        EntityType::builder(name)
            .field(FieldDescriptor::new("name", FieldKind::String))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let schema =
            Schema::from_entities([named("Location"), named("Equipment"), named("Service")])
                .unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            ["Location", "Equipment", "Service"]
        );
        assert_eq!(schema.entity("Equipment").unwrap().name(), "Equipment");
    }

    #[test]
    fn test_unknown_entity_type() {
        let schema = Schema::new();
        assert!(schema.is_empty());
        assert_eq!(
            schema.entity("Widget").unwrap_err(),
            Error::UnknownEntityType {
                entity: "Widget".into()
            }
        );
    }

    #[test]
    fn test_duplicate_entity_type() {
        let mut schema = Schema::new();
        schema.register(named("Location")).unwrap();
        let err = schema.register(named("Location")).unwrap_err();
        assert!(matches!(err, Error::DuplicateEntityType { .. }));
        assert_eq!(schema.len(), 1);
    }
}
