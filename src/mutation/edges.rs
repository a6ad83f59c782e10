//! Pending relationship changes of a mutation.

use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use indexmap::IndexSet as IndexSetRaw;

use crate::errors::Error;
use crate::{EdgeDescriptor, EntitySchema, Id};

/// `IndexSet` alias using hashbrown's default hasher for `no_std` compatibility.
type IndexSet<T> = IndexSetRaw<T, hashbrown::DefaultHashBuilder>;

/// The pending state of one edge.
///
/// `added` and `removed` never share an id. `cleared` is independent of both:
/// the persistence engine detaches everything first, then applies `added`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EdgeSlot {
    added: IndexSet<Id>,
    removed: IndexSet<Id>,
    cleared: bool,
}

impl EdgeSlot {
    fn is_untouched(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.cleared
    }
}

/// Edge slots, indexed by edge declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EdgeStore {
    slots: Vec<EdgeSlot>,
}

impl EdgeStore {
    /// Creates a store with one untouched slot per declared edge.
    pub(crate) fn new<T: EntitySchema>(schema: &T) -> Self {
        Self {
            slots: vec![EdgeSlot::default(); schema.edges().len()],
        }
    }

    fn resolve<'s, T: EntitySchema>(
        schema: &'s T,
        name: &str,
    ) -> Result<(usize, &'s EdgeDescriptor), Error> {
        let idx = schema.edge_index(name).ok_or_else(|| Error::UnknownEdge {
            entity: schema.name().to_string(),
            edge: name.to_string(),
        })?;
        Ok((idx, &schema.edges()[idx]))
    }

    fn cardinality_error<T: EntitySchema>(schema: &T, name: &str, action: &'static str) -> Error {
        Error::InvalidCardinality {
            entity: schema.name().to_string(),
            edge: name.to_string(),
            action,
        }
    }

    /// Attaches `ids` to the edge.
    ///
    /// To-many edges take the union and drop the ids from the pending
    /// removals. To-one edges take exactly one id, which replaces the pending
    /// one and cancels a pending clear.
    pub(crate) fn add<T: EntitySchema>(
        &mut self,
        schema: &T,
        name: &str,
        ids: &[Id],
    ) -> Result<(), Error> {
        let (idx, edge) = Self::resolve(schema, name)?;
        let slot = &mut self.slots[idx];

        if edge.is_to_one() {
            let [id] = ids else {
                return Err(Self::cardinality_error(
                    schema,
                    name,
                    "attach more or less than one id",
                ));
            };
            slot.added.clear();
            slot.added.insert(*id);
            slot.cleared = false;
            return Ok(());
        }

        for id in ids {
            slot.removed.shift_remove(id);
            slot.added.insert(*id);
        }
        Ok(())
    }

    /// Detaches `ids` from a to-many edge, dropping them from the pending additions.
    pub(crate) fn remove<T: EntitySchema>(
        &mut self,
        schema: &T,
        name: &str,
        ids: &[Id],
    ) -> Result<(), Error> {
        let (idx, edge) = Self::resolve(schema, name)?;
        if edge.is_to_one() {
            return Err(Self::cardinality_error(schema, name, "remove ids"));
        }

        let slot = &mut self.slots[idx];
        for id in ids {
            slot.added.shift_remove(id);
            slot.removed.insert(*id);
        }
        Ok(())
    }

    /// Marks the edge for full detachment.
    ///
    /// On a to-one edge this also drops the pending id.
    pub(crate) fn clear<T: EntitySchema>(&mut self, schema: &T, name: &str) -> Result<(), Error> {
        let (idx, edge) = Self::resolve(schema, name)?;
        let slot = &mut self.slots[idx];
        if edge.is_to_one() {
            slot.added.clear();
        }
        slot.cleared = true;
        Ok(())
    }

    /// Returns whether the edge is pending full detachment.
    pub(crate) fn is_cleared<T: EntitySchema>(&self, schema: &T, name: &str) -> bool {
        schema
            .edge_index(name)
            .is_some_and(|idx| self.slots[idx].cleared)
    }

    /// Ids pending attachment, in insertion order.
    pub(crate) fn added_ids<T: EntitySchema>(&self, schema: &T, name: &str) -> Vec<Id> {
        schema
            .edge_index(name)
            .map(|idx| self.slots[idx].added.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ids pending detachment, in insertion order.
    pub(crate) fn removed_ids<T: EntitySchema>(&self, schema: &T, name: &str) -> Vec<Id> {
        schema
            .edge_index(name)
            .map(|idx| self.slots[idx].removed.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drops all pending state of the edge.
    pub(crate) fn reset<T: EntitySchema>(&mut self, schema: &T, name: &str) -> Result<(), Error> {
        let (idx, _) = Self::resolve(schema, name)?;
        self.slots[idx] = EdgeSlot::default();
        Ok(())
    }

    /// Declaration indices of edges with any pending state.
    pub(crate) fn touched(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| !slot.is_untouched())
    }

    /// Declaration indices of edges with ids pending attachment.
    pub(crate) fn added_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| !slot.added.is_empty())
    }

    /// Declaration indices of edges with ids pending detachment.
    pub(crate) fn removed_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| !slot.removed.is_empty())
    }

    /// Declaration indices of edges pending full detachment.
    pub(crate) fn cleared_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices(|slot| slot.cleared)
    }

    /// Returns whether no edge has pending state.
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.iter().all(EdgeSlot::is_untouched)
    }

    fn indices<'a>(
        &'a self,
        pred: impl Fn(&EdgeSlot) -> bool + 'a,
    ) -> impl Iterator<Item = usize> + 'a {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(idx, slot)| pred(slot).then_some(idx))
    }
}
