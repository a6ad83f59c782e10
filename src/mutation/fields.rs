//! Pending scalar changes of a mutation.

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::Error;
use crate::{EntitySchema, FieldDescriptor, Value};

/// The pending state of one field.
///
/// A single slot per field makes "set" and "cleared" mutually exclusive by
/// construction. A delta replaces a pending value or clear, and a value or
/// clear replaces a pending delta: the most recent call wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum FieldSlot {
    /// Untouched by the mutation.
    #[default]
    Unset,
    /// Will be written as given.
    Value(Value),
    /// Will be written as null.
    Cleared,
    /// Will be added to the stored value.
    Delta(Value),
}

/// Field slots, indexed by field declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldStore {
    slots: Vec<FieldSlot>,
}

impl FieldStore {
    /// Creates a store with one untouched slot per declared field.
    pub(crate) fn new<T: EntitySchema>(schema: &T) -> Self {
        Self {
            slots: vec![FieldSlot::Unset; schema.fields().len()],
        }
    }

    /// Resolves `name` to its declaration index and descriptor.
    fn resolve<'s, T: EntitySchema>(
        schema: &'s T,
        name: &str,
    ) -> Result<(usize, &'s FieldDescriptor), Error> {
        let idx = schema.field_index(name).ok_or_else(|| Error::UnknownField {
            entity: schema.name().to_string(),
            field: name.to_string(),
        })?;
        Ok((idx, &schema.fields()[idx]))
    }

    fn check_kind<T: EntitySchema>(
        schema: &T,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<(), Error> {
        if field.kind().accepts(value) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                entity: schema.name().to_string(),
                field: field.name().to_string(),
                expected: field.kind().name(),
                found: value.kind_name(),
            })
        }
    }

    /// Records `value` for the field, discarding any clear or delta.
    pub(crate) fn set<T: EntitySchema>(
        &mut self,
        schema: &T,
        name: &str,
        value: Value,
    ) -> Result<(), Error> {
        let (idx, field) = Self::resolve(schema, name)?;
        Self::check_kind(schema, field, &value)?;
        self.slots[idx] = FieldSlot::Value(value);
        Ok(())
    }

    /// Returns the pending value of the field, if one is set.
    pub(crate) fn get<T: EntitySchema>(&self, schema: &T, name: &str) -> Option<&Value> {
        match &self.slots[schema.field_index(name)?] {
            FieldSlot::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Records a clear for a nullable field, discarding any value or delta.
    pub(crate) fn clear<T: EntitySchema>(&mut self, schema: &T, name: &str) -> Result<(), Error> {
        let (idx, field) = Self::resolve(schema, name)?;
        if !field.is_nullable() {
            return Err(Error::UnclearableField {
                entity: schema.name().to_string(),
                field: name.to_string(),
            });
        }
        self.slots[idx] = FieldSlot::Cleared;
        Ok(())
    }

    /// Returns whether the field is pending a clear.
    pub(crate) fn is_cleared<T: EntitySchema>(&self, schema: &T, name: &str) -> bool {
        schema
            .field_index(name)
            .is_some_and(|idx| self.slots[idx] == FieldSlot::Cleared)
    }

    /// Adds `delta` to the pending delta of a numeric field.
    pub(crate) fn add<T: EntitySchema>(
        &mut self,
        schema: &T,
        name: &str,
        delta: Value,
    ) -> Result<(), Error> {
        let (idx, field) = Self::resolve(schema, name)?;
        if !field.is_numeric() {
            return Err(Error::NonNumericField {
                entity: schema.name().to_string(),
                field: name.to_string(),
            });
        }
        Self::check_kind(schema, field, &delta)?;

        let slot = &mut self.slots[idx];
        let total = match slot {
            FieldSlot::Delta(current) => current.accumulate(&delta).unwrap_or(delta),
            _ => delta,
        };
        *slot = FieldSlot::Delta(total);
        Ok(())
    }

    /// Returns the accumulated delta of the field, if any.
    pub(crate) fn added<T: EntitySchema>(&self, schema: &T, name: &str) -> Option<&Value> {
        match &self.slots[schema.field_index(name)?] {
            FieldSlot::Delta(delta) => Some(delta),
            _ => None,
        }
    }

    /// Drops all pending state of the field.
    pub(crate) fn reset<T: EntitySchema>(&mut self, schema: &T, name: &str) -> Result<(), Error> {
        let (idx, _) = Self::resolve(schema, name)?;
        self.slots[idx] = FieldSlot::Unset;
        Ok(())
    }

    /// Declaration indices of fields pending a value or a clear.
    pub(crate) fn touched(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| matches!(slot, FieldSlot::Value(_) | FieldSlot::Cleared))
    }

    /// Declaration indices of fields pending a clear.
    pub(crate) fn cleared(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| *slot == FieldSlot::Cleared)
    }

    /// Declaration indices of fields pending a delta.
    pub(crate) fn added_fields(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| matches!(slot, FieldSlot::Delta(_)))
    }

    /// Returns whether no field has pending state.
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| *slot == FieldSlot::Unset)
    }

    fn indices<'a>(
        &'a self,
        pred: impl Fn(&FieldSlot) -> bool + 'a,
    ) -> impl Iterator<Item = usize> + 'a {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(idx, slot)| pred(slot).then_some(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityType, FieldKind};

    fn property() -> EntityType {
        EntityType::builder("Property")
            .field(FieldDescriptor::new("int_val", FieldKind::Int).nullable())
            .field(FieldDescriptor::new("float_val", FieldKind::Float))
            .field(FieldDescriptor::new("string_val", FieldKind::String).nullable())
            .field(FieldDescriptor::new("bool_val", FieldKind::Bool))
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let schema = property();
        let mut store = FieldStore::new(&schema);
        store.set(&schema, "string_val", "a".into()).unwrap();
        assert_eq!(store.get(&schema, "string_val"), Some(&Value::from("a")));
        assert_eq!(store.touched().collect::<Vec<_>>(), [2]);
    }

    #[test]
    fn test_clear_replaces_value_and_back() {
        let schema = property();
        let mut store = FieldStore::new(&schema);
        store.set(&schema, "int_val", Value::Int(3)).unwrap();
        store.clear(&schema, "int_val").unwrap();
        assert_eq!(store.get(&schema, "int_val"), None);
        assert!(store.is_cleared(&schema, "int_val"));

        store.set(&schema, "int_val", Value::Int(4)).unwrap();
        assert!(!store.is_cleared(&schema, "int_val"));
        assert_eq!(store.get(&schema, "int_val"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_delta_accumulates_and_value_overrides() {
        let schema = property();
        let mut store = FieldStore::new(&schema);
        store.add(&schema, "float_val", Value::Float(1.5)).unwrap();
        store.add(&schema, "float_val", Value::Float(2.0)).unwrap();
        assert_eq!(store.added(&schema, "float_val"), Some(&Value::Float(3.5)));
        assert_eq!(store.added_fields().collect::<Vec<_>>(), [1]);
        assert_eq!(store.touched().count(), 0);

        store.set(&schema, "float_val", Value::Float(10.0)).unwrap();
        assert_eq!(store.added(&schema, "float_val"), None);
        assert_eq!(store.get(&schema, "float_val"), Some(&Value::Float(10.0)));
    }

    #[test]
    fn test_delta_after_value_wins() {
        let schema = property();
        let mut store = FieldStore::new(&schema);
        store.set(&schema, "int_val", Value::Int(10)).unwrap();
        store.add(&schema, "int_val", Value::Int(2)).unwrap();
        assert_eq!(store.get(&schema, "int_val"), None);
        assert_eq!(store.added(&schema, "int_val"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let schema = property();
        let mut store = FieldStore::new(&schema);
        store.set(&schema, "bool_val", Value::Bool(true)).unwrap();
        let before = store.clone();

        assert!(matches!(
            store.set(&schema, "bool_val", Value::Int(1)),
            Err(Error::TypeMismatch { expected: "bool", found: "int", .. })
        ));
        assert!(matches!(
            store.clear(&schema, "bool_val"),
            Err(Error::UnclearableField { .. })
        ));
        assert!(matches!(
            store.add(&schema, "bool_val", Value::Int(1)),
            Err(Error::NonNumericField { .. })
        ));
        assert!(matches!(
            store.add(&schema, "int_val", Value::Float(1.0)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            store.set(&schema, "missing", Value::Int(1)),
            Err(Error::UnknownField { .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_reset_and_unknown_reads() {
        let schema = property();
        let mut store = FieldStore::new(&schema);
        store.clear(&schema, "string_val").unwrap();
        store.reset(&schema, "string_val").unwrap();
        assert!(store.is_empty());
        assert!(!store.is_cleared(&schema, "string_val"));
        assert_eq!(store.get(&schema, "missing"), None);
        assert_eq!(store.added(&schema, "missing"), None);
        assert!(store.reset(&schema, "missing").is_err());
    }
}
