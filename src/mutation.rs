//! The pending change to one node.
//!
//! A [`Mutation`] records field and edge changes against an entity schema
//! without touching storage. The persistence engine later walks it through
//! the name-based accessors below and never needs entity-specific code.
//!
//! # Field states
//!
//! | Call | Effect on the slot |
//! |------|--------------------|
//! | `set_field` | value, replaces a clear or delta |
//! | `clear_field` | cleared, replaces a value or delta |
//! | `add_field` | delta, summed with a previous delta, replaces a value or clear |
//! | `reset_field` | untouched |
//!
//! # Edge states
//!
//! | Call | To-many | To-one |
//! |------|---------|--------|
//! | `add_edge_ids` | union into added, drop from removed | replace the single id, cancel clear |
//! | `remove_edge_ids` | union into removed, drop from added | rejected |
//! | `clear_edge` | flag cleared | flag cleared, drop the pending id |
//! | `reset_edge` | untouched | untouched |

mod edges;
mod fields;

use alloc::vec::Vec;

use edges::EdgeStore;
use fields::FieldStore;

use crate::client::{Client, Tx};
use crate::errors::Error;
use crate::{EdgeDescriptor, EntitySchema, FieldDescriptor, Id, Op, Value};

/// An in-flight, not yet committed change to one node.
///
/// The set of valid field and edge names is fixed by the schema `T` at
/// construction. A mutation is meant to be filled by one caller and then
/// handed, by value, to a [`Mutator`](crate::Mutator) exactly once.
///
/// # Example
///
/// ```
/// use graph_changeset::{Client, EdgeDescriptor, EntityType, FieldDescriptor, FieldKind, Id, Op, Schema};
///
/// let widget = EntityType::builder("Widget")
///     .field(FieldDescriptor::new("name", FieldKind::String))
///     .field(FieldDescriptor::new("price", FieldKind::Int))
///     .edge(EdgeDescriptor::to_many("tags", "Tag"))
///     .build()
///     .unwrap();
/// let client = Client::new(Schema::from_entities([widget]).unwrap());
///
/// let mut mutation = client.create("Widget").unwrap();
/// mutation.set_field("name", "a").unwrap();
/// mutation.set_field("price", 10).unwrap();
/// mutation.add_edge_ids("tags", [5, 6]).unwrap();
///
/// assert_eq!(mutation.op(), Op::Create);
/// assert_eq!(mutation.fields(), ["name", "price"]);
/// assert_eq!(mutation.added_ids("tags"), [Id(5), Id(6)]);
/// ```
#[derive(Debug)]
pub struct Mutation<T: EntitySchema> {
    schema: T,
    op: Op,
    id: Option<Id>,
    fields: FieldStore,
    edges: EdgeStore,
    client: Client,
}

impl<T: EntitySchema> Mutation<T> {
    /// Creates a mutation for a node that does not exist yet.
    #[must_use]
    pub fn create(schema: T, client: Client) -> Self {
        Self::build(schema, Op::Create, None, client)
    }

    /// Creates a mutation whose subject is the node `id`.
    ///
    /// Any operation may be used; for [`Op::Create`] the id is taken as
    /// chosen by the caller.
    #[must_use]
    pub fn targeting(schema: T, op: Op, id: impl Into<Id>, client: Client) -> Self {
        Self::build(schema, op, Some(id.into()), client)
    }

    fn build(schema: T, op: Op, id: Option<Id>, client: Client) -> Self {
        Self {
            fields: FieldStore::new(&schema),
            edges: EdgeStore::new(&schema),
            schema,
            op,
            id,
            client,
        }
    }

    /// The schema of the entity type this mutation applies to.
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &T {
        &self.schema
    }

    /// The entity type name.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// The operation.
    #[inline]
    #[must_use]
    pub fn op(&self) -> Op {
        self.op
    }

    /// The subject id, if known.
    ///
    /// Present for every operation except a [`Op::Create`] whose node has
    /// not been inserted yet.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    /// Records the id the persistence engine assigned to a created node.
    ///
    /// # Errors
    ///
    /// * `IdAlreadyAssigned` - If the mutation already has a subject id.
    ///
    pub fn assign_id(&mut self, id: impl Into<Id>) -> Result<(), Error> {
        if self.id.is_some() {
            return Err(Error::IdAlreadyAssigned { op: self.op });
        }
        self.id = Some(id.into());
        Ok(())
    }

    /// A non-transactional view of the client the mutation was built with.
    #[must_use]
    pub fn client(&self) -> Client {
        self.client.without_tx()
    }

    /// The transaction the mutation was built in.
    ///
    /// # Errors
    ///
    /// * `NotInTransaction` - If the mutation was built outside a transaction.
    ///
    pub fn tx(&self) -> Result<Tx, Error> {
        Tx::from_client(&self.client)
    }

    /// Returns whether no field or edge change is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.edges.is_empty()
    }

    fn writable(&self) -> Result<(), Error> {
        if self.op.is_delete() {
            return Err(Error::ReadOnlyOperation {
                op: self.op,
                entity: self.schema.name().into(),
            });
        }
        Ok(())
    }

    fn traced(&self, name: &str, result: Result<(), Error>) -> Result<(), Error> {
        if let Err(err) = &result {
            tracing::trace!(
                entity = self.schema.name(),
                op = %self.op,
                key = name,
                error = %err,
                "rejected mutation change"
            );
        }
        result
    }

    fn field_names(&self, indices: impl Iterator<Item = usize>) -> Vec<&str> {
        let fields = self.schema.fields();
        indices.map(|idx| fields[idx].name()).collect()
    }

    fn edge_names(&self, indices: impl Iterator<Item = usize>) -> Vec<&str> {
        let edges = self.schema.edges();
        indices.map(|idx| edges[idx].name()).collect()
    }

    // ------------------------------------------------------------------
    // Fields
    // ------------------------------------------------------------------

    /// Sets a field to `value`, replacing a pending clear or delta.
    ///
    /// # Errors
    ///
    /// * `UnknownField` - If the field is not declared.
    /// * `TypeMismatch` - If the value does not match the field kind.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        let result = self
            .writable()
            .and_then(|()| self.fields.set(&self.schema, name, value.into()));
        self.traced(name, result)
    }

    /// Returns the pending value of a field.
    ///
    /// `None` when the field is untouched, cleared, only carries a delta, or
    /// is not declared. Storage is never consulted.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(&self.schema, name)
    }

    /// Clears a nullable field, replacing a pending value or delta.
    ///
    /// On a create this writes the zero value; on an update it unsets the
    /// stored value.
    ///
    /// # Errors
    ///
    /// * `UnknownField` - If the field is not declared.
    /// * `UnclearableField` - If the field is not nullable.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn clear_field(&mut self, name: &str) -> Result<(), Error> {
        let result = self
            .writable()
            .and_then(|()| self.fields.clear(&self.schema, name));
        self.traced(name, result)
    }

    /// Returns whether a field is pending a clear.
    #[must_use]
    pub fn field_cleared(&self, name: &str) -> bool {
        self.fields.is_cleared(&self.schema, name)
    }

    /// Adds `delta` to a numeric field, summing with earlier deltas.
    ///
    /// A pending value or clear is replaced by the delta.
    ///
    /// # Errors
    ///
    /// * `UnknownField` - If the field is not declared.
    /// * `NonNumericField` - If the field is not numeric.
    /// * `TypeMismatch` - If the delta does not match the field kind.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn add_field(&mut self, name: &str, delta: impl Into<Value>) -> Result<(), Error> {
        let result = self
            .writable()
            .and_then(|()| self.fields.add(&self.schema, name, delta.into()));
        self.traced(name, result)
    }

    /// Returns the accumulated delta of a numeric field.
    #[must_use]
    pub fn added_field(&self, name: &str) -> Option<&Value> {
        self.fields.added(&self.schema, name)
    }

    /// Drops every pending change of a field.
    ///
    /// # Errors
    ///
    /// * `UnknownField` - If the field is not declared.
    ///
    pub fn reset_field(&mut self, name: &str) -> Result<(), Error> {
        let result = self.fields.reset(&self.schema, name);
        self.traced(name, result)
    }

    /// Names of fields pending a value or a clear, in declaration order.
    ///
    /// Fields that only carry a delta are listed by
    /// [`added_fields`](Self::added_fields).
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.field_names(self.fields.touched())
    }

    /// Names of fields pending a clear, in declaration order.
    #[must_use]
    pub fn cleared_fields(&self) -> Vec<&str> {
        self.field_names(self.fields.cleared())
    }

    /// Names of fields pending a delta, in declaration order.
    #[must_use]
    pub fn added_fields(&self) -> Vec<&str> {
        self.field_names(self.fields.added_fields())
    }

    /// Declarations of the fields pending a value or a clear.
    pub fn touched_fields(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        let fields = self.schema.fields();
        self.fields.touched().map(move |idx| &fields[idx])
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Attaches target ids to an edge.
    ///
    /// To-many edges take the union; to-one edges take exactly one id, which
    /// replaces the pending one.
    ///
    /// # Errors
    ///
    /// * `UnknownEdge` - If the edge is not declared.
    /// * `InvalidCardinality` - If a to-one edge is given other than one id.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn add_edge_ids<I>(&mut self, name: &str, ids: impl IntoIterator<Item = I>) -> Result<(), Error>
    where
        I: Into<Id>,
    {
        let ids: Vec<Id> = ids.into_iter().map(Into::into).collect();
        let result = self
            .writable()
            .and_then(|()| self.edges.add(&self.schema, name, &ids));
        self.traced(name, result)
    }

    /// Sets the target of a to-one edge.
    ///
    /// # Errors
    ///
    /// * `UnknownEdge` - If the edge is not declared.
    /// * `InvalidCardinality` - If the edge is to-many.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn set_edge_id(&mut self, name: &str, id: impl Into<Id>) -> Result<(), Error> {
        let result = self.writable().and_then(|()| match self.schema.edge(name) {
            Some(edge) if !edge.is_to_one() => Err(Error::InvalidCardinality {
                entity: self.schema.name().into(),
                edge: name.into(),
                action: "set a single id",
            }),
            _ => self.edges.add(&self.schema, name, &[id.into()]),
        });
        self.traced(name, result)
    }

    /// Detaches target ids from a to-many edge.
    ///
    /// # Errors
    ///
    /// * `UnknownEdge` - If the edge is not declared.
    /// * `InvalidCardinality` - If the edge is to-one; use
    ///   [`clear_edge`](Self::clear_edge) instead.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn remove_edge_ids<I>(
        &mut self,
        name: &str,
        ids: impl IntoIterator<Item = I>,
    ) -> Result<(), Error>
    where
        I: Into<Id>,
    {
        let ids: Vec<Id> = ids.into_iter().map(Into::into).collect();
        let result = self
            .writable()
            .and_then(|()| self.edges.remove(&self.schema, name, &ids));
        self.traced(name, result)
    }

    /// Marks an edge for full detachment.
    ///
    /// # Errors
    ///
    /// * `UnknownEdge` - If the edge is not declared.
    /// * `ReadOnlyOperation` - If the mutation deletes nodes.
    ///
    pub fn clear_edge(&mut self, name: &str) -> Result<(), Error> {
        let result = self
            .writable()
            .and_then(|()| self.edges.clear(&self.schema, name));
        self.traced(name, result)
    }

    /// Returns whether an edge is pending full detachment.
    #[must_use]
    pub fn edge_cleared(&self, name: &str) -> bool {
        self.edges.is_cleared(&self.schema, name)
    }

    /// Ids pending attachment on an edge; at most one for to-one edges.
    #[must_use]
    pub fn added_ids(&self, name: &str) -> Vec<Id> {
        self.edges.added_ids(&self.schema, name)
    }

    /// The pending target of a to-one edge.
    #[must_use]
    pub fn edge_id(&self, name: &str) -> Option<Id> {
        match self.schema.edge(name) {
            Some(edge) if edge.is_to_one() => self.added_ids(name).first().copied(),
            _ => None,
        }
    }

    /// Ids pending detachment from a to-many edge.
    #[must_use]
    pub fn removed_ids(&self, name: &str) -> Vec<Id> {
        self.edges.removed_ids(&self.schema, name)
    }

    /// Drops every pending change of an edge.
    ///
    /// # Errors
    ///
    /// * `UnknownEdge` - If the edge is not declared.
    ///
    pub fn reset_edge(&mut self, name: &str) -> Result<(), Error> {
        let result = self.edges.reset(&self.schema, name);
        self.traced(name, result)
    }

    /// Names of edges with ids pending attachment, in declaration order.
    #[must_use]
    pub fn added_edges(&self) -> Vec<&str> {
        self.edge_names(self.edges.added_edges())
    }

    /// Names of edges with ids pending detachment, in declaration order.
    #[must_use]
    pub fn removed_edges(&self) -> Vec<&str> {
        self.edge_names(self.edges.removed_edges())
    }

    /// Names of edges pending full detachment, in declaration order.
    #[must_use]
    pub fn cleared_edges(&self) -> Vec<&str> {
        self.edge_names(self.edges.cleared_edges())
    }

    /// Declarations of every edge with pending state.
    pub fn touched_edges(&self) -> impl Iterator<Item = &EdgeDescriptor> + '_ {
        let edges = self.schema.edges();
        self.edges.touched().map(move |idx| &edges[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityType, FieldKind, Schema};

    const STATUS: &[&str] = &["PLANNED", "PENDING", "DONE"];

    fn work_order() -> EntityType {
        EntityType::builder("WorkOrder")
            .field(FieldDescriptor::new("name", FieldKind::String))
            .field(FieldDescriptor::new("status", FieldKind::Enum(STATUS)))
            .field(FieldDescriptor::new("index", FieldKind::Int).nullable())
            .field(FieldDescriptor::new("close_date", FieldKind::Time).nullable())
            .edge(EdgeDescriptor::to_one("owner", "User"))
            .edge(EdgeDescriptor::to_many("equipment", "Equipment"))
            .build()
            .unwrap()
    }

    fn client() -> Client {
        Client::new(Schema::from_entities([work_order()]).unwrap())
    }

    #[test]
    fn test_create_has_no_id_until_assigned() {
        let mut mutation = Mutation::create(work_order(), client());
        assert_eq!(mutation.id(), None);
        mutation.assign_id(12).unwrap();
        assert_eq!(mutation.id(), Some(Id(12)));
        assert_eq!(
            mutation.assign_id(13),
            Err(Error::IdAlreadyAssigned { op: Op::Create })
        );
        assert_eq!(mutation.id(), Some(Id(12)));
    }

    #[test]
    fn test_update_carries_id() {
        let mut mutation = Mutation::targeting(work_order(), Op::UpdateOne, 42, client());
        assert_eq!(mutation.id(), Some(Id(42)));
        assert_eq!(mutation.type_name(), "WorkOrder");
        assert!(mutation.assign_id(1).is_err());
    }

    #[test]
    fn test_enum_field_validation() {
        let mut mutation = Mutation::create(work_order(), client());
        mutation
            .set_field("status", Value::Enum("DONE".into()))
            .unwrap();
        let err = mutation
            .set_field("status", Value::Enum("LOST".into()))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: "enum", .. }));
        assert_eq!(mutation.field("status"), Some(&Value::Enum("DONE".into())));
    }

    #[test]
    fn test_field_enumerations_follow_declaration_order() {
        let mut mutation = Mutation::targeting(work_order(), Op::Update, 1, client());
        mutation.clear_field("close_date").unwrap();
        mutation.set_field("name", "wo").unwrap();
        mutation.add_field("index", 2).unwrap();
        assert_eq!(mutation.fields(), ["name", "close_date"]);
        assert_eq!(mutation.cleared_fields(), ["close_date"]);
        assert_eq!(mutation.added_fields(), ["index"]);
        assert_eq!(
            mutation
                .touched_fields()
                .map(FieldDescriptor::name)
                .collect::<Vec<_>>(),
            ["name", "close_date"]
        );
    }

    #[test]
    fn test_edge_helpers() {
        let mut mutation = Mutation::create(work_order(), client());
        mutation.set_edge_id("owner", 3).unwrap();
        mutation.set_edge_id("owner", 4).unwrap();
        assert_eq!(mutation.edge_id("owner"), Some(Id(4)));
        assert_eq!(mutation.edge_id("equipment"), None);
        assert!(matches!(
            mutation.set_edge_id("equipment", 1),
            Err(Error::InvalidCardinality { .. })
        ));
        assert!(matches!(
            mutation.set_edge_id("missing", 1),
            Err(Error::UnknownEdge { .. })
        ));
        mutation.clear_edge("equipment").unwrap();
        assert_eq!(
            mutation
                .touched_edges()
                .map(EdgeDescriptor::name)
                .collect::<Vec<_>>(),
            ["owner", "equipment"]
        );
    }

    #[test]
    fn test_delete_rejects_setters() {
        for op in [Op::Delete, Op::DeleteOne] {
            let mut mutation = Mutation::targeting(work_order(), op, 7, client());
            let read_only = Err(Error::ReadOnlyOperation {
                op,
                entity: "WorkOrder".into(),
            });
            assert_eq!(mutation.set_field("name", "x"), read_only);
            assert_eq!(mutation.clear_field("close_date"), read_only);
            assert_eq!(mutation.add_field("index", 1), read_only);
            for edge in ["owner", "equipment"] {
                assert_eq!(mutation.add_edge_ids(edge, [1]), read_only, "{edge}");
                assert_eq!(mutation.remove_edge_ids(edge, [1]), read_only, "{edge}");
                assert_eq!(mutation.set_edge_id(edge, 1), read_only, "{edge}");
                assert_eq!(mutation.clear_edge(edge), read_only, "{edge}");
            }
            assert!(mutation.is_empty());
            assert!(mutation.fields().is_empty());
            assert!(mutation.added_edges().is_empty());
            assert_eq!(mutation.touched_edges().count(), 0);
            mutation.reset_field("name").unwrap();
            mutation.reset_edge("owner").unwrap();
        }
    }

    #[test]
    fn test_delete_set_edge_id_on_to_many_is_read_only() {
        let mut mutation = Mutation::targeting(work_order(), Op::DeleteOne, 7, client());
        assert_eq!(
            mutation.set_edge_id("equipment", 1),
            Err(Error::ReadOnlyOperation {
                op: Op::DeleteOne,
                entity: "WorkOrder".into(),
            })
        );
        assert_eq!(mutation.edge_id("owner"), None);
    }
}
