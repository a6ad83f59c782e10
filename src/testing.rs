//! Invariant checks shared by the fuzz harness and the randomized tests.
//!
//! This module is gated behind the `testing` feature.
//!
//! # Provided helpers
//!
//! - [`widget_type`] and [`widget_client`]: a fixture entity type covering
//!   every field kind and both edge cardinalities
//! - [`MutationScript`]: an operation plus a sequence of [`Action`]s,
//!   generated with `arbitrary`
//! - [`test_mutation_invariants`]: replays a script and asserts the store
//!   invariants after every call

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use arbitrary::Arbitrary;

use crate::{
    Client, EdgeDescriptor, EntityMutation, EntitySchema, EntityType, Error, FieldDescriptor,
    FieldKind, Id, Mutation, Op, Schema, Value,
};

/// Name of the fixture entity type.
pub const WIDGET: &str = "Widget";

/// Variants of the fixture `status` enum field.
pub const WIDGET_STATUS: &[&str] = &["DRAFT", "LIVE", "RETIRED"];

/// A name that is declared neither as a field nor as an edge.
pub const UNDECLARED: &str = "undeclared";

/// The fixture entity type.
///
/// # Panics
///
/// Never; the declarations are fixed and free of duplicates.
#[must_use]
pub fn widget_type() -> EntityType {
    EntityType::builder(WIDGET)
        .field(FieldDescriptor::new("name", FieldKind::String))
        .field(FieldDescriptor::new("price", FieldKind::Int))
        .field(FieldDescriptor::new("weight", FieldKind::Float).nullable())
        .field(FieldDescriptor::new("note", FieldKind::String).nullable())
        .field(FieldDescriptor::new("status", FieldKind::Enum(WIDGET_STATUS)).nullable())
        .field(FieldDescriptor::new("released_at", FieldKind::Time).nullable())
        .field(FieldDescriptor::new("labels", FieldKind::Strings))
        .field(FieldDescriptor::new("attributes", FieldKind::Json).nullable())
        .field(FieldDescriptor::new("active", FieldKind::Bool))
        .edge(EdgeDescriptor::to_many("tags", "Tag"))
        .edge(EdgeDescriptor::to_many("parts", "Part").unique())
        .edge(EdgeDescriptor::to_one("owner", "User"))
        .build()
        .expect("fixture declarations are unique")
}

/// A client whose registry holds only [`widget_type`].
///
/// # Panics
///
/// Never; the registry holds a single entity type.
#[must_use]
pub fn widget_client() -> Client {
    Client::new(Schema::from_entities([widget_type()]).expect("single entity type"))
}

/// One call against a mutation.
///
/// Names are picked by index over the declared fields or edges; the index
/// one past the end picks [`UNDECLARED`].
#[derive(Debug, Clone, Arbitrary)]
pub enum Action {
    /// `set_field`.
    SetField(u8, Value),
    /// `clear_field`.
    ClearField(u8),
    /// `add_field`.
    AddField(u8, Value),
    /// `reset_field`.
    ResetField(u8),
    /// `add_edge_ids`; small ids make overlaps likely.
    AddEdgeIds(u8, Vec<i8>),
    /// `remove_edge_ids`.
    RemoveEdgeIds(u8, Vec<i8>),
    /// `set_edge_id`.
    SetEdgeId(u8, i8),
    /// `clear_edge`.
    ClearEdge(u8),
    /// `reset_edge`.
    ResetEdge(u8),
}

impl Action {
    fn is_setter(&self) -> bool {
        !matches!(self, Action::ResetField(_) | Action::ResetEdge(_))
    }
}

/// A mutation operation and the calls to replay against it.
#[derive(Debug, Clone, Arbitrary)]
pub struct MutationScript {
    /// Operation the mutation is built with.
    pub op: Op,
    /// Calls replayed in order.
    pub actions: Vec<Action>,
}

fn pick<'a>(mut names: impl ExactSizeIterator<Item = &'a str>, index: u8) -> &'a str {
    let len = names.len();
    names
        .nth(usize::from(index) % (len + 1))
        .unwrap_or(UNDECLARED)
}

fn field_name(mutation: &EntityMutation, index: u8) -> String {
    pick(
        mutation.schema().fields().iter().map(FieldDescriptor::name),
        index,
    )
    .to_string()
}

fn edge_name(mutation: &EntityMutation, index: u8) -> String {
    pick(
        mutation.schema().edges().iter().map(EdgeDescriptor::name),
        index,
    )
    .to_string()
}

fn ids(raw: &[i8]) -> Vec<Id> {
    raw.iter().map(|&id| Id(i64::from(id))).collect()
}

/// Everything observable about a mutation through its public accessors.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    fields: Vec<(Option<Value>, bool, Option<Value>)>,
    edges: Vec<(Vec<Id>, Vec<Id>, bool)>,
    id: Option<Id>,
}

impl Snapshot {
    fn of(mutation: &EntityMutation) -> Self {
        let schema = mutation.schema();
        Self {
            fields: schema
                .fields()
                .iter()
                .map(|field| {
                    let name = field.name();
                    (
                        mutation.field(name).cloned(),
                        mutation.field_cleared(name),
                        mutation.added_field(name).cloned(),
                    )
                })
                .collect(),
            edges: schema
                .edges()
                .iter()
                .map(|edge| {
                    let name = edge.name();
                    (
                        mutation.added_ids(name),
                        mutation.removed_ids(name),
                        mutation.edge_cleared(name),
                    )
                })
                .collect(),
            id: mutation.id(),
        }
    }
}

fn apply(mutation: &mut EntityMutation, action: &Action) -> Result<(), Error> {
    match action {
        Action::SetField(index, value) => {
            let name = field_name(mutation, *index);
            mutation.set_field(&name, value.clone())
        }
        Action::ClearField(index) => {
            let name = field_name(mutation, *index);
            mutation.clear_field(&name)
        }
        Action::AddField(index, delta) => {
            let name = field_name(mutation, *index);
            mutation.add_field(&name, delta.clone())
        }
        Action::ResetField(index) => {
            let name = field_name(mutation, *index);
            mutation.reset_field(&name)
        }
        Action::AddEdgeIds(index, raw) => {
            let name = edge_name(mutation, *index);
            mutation.add_edge_ids(&name, ids(raw))
        }
        Action::RemoveEdgeIds(index, raw) => {
            let name = edge_name(mutation, *index);
            mutation.remove_edge_ids(&name, ids(raw))
        }
        Action::SetEdgeId(index, id) => {
            let name = edge_name(mutation, *index);
            mutation.set_edge_id(&name, i64::from(*id))
        }
        Action::ClearEdge(index) => {
            let name = edge_name(mutation, *index);
            mutation.clear_edge(&name)
        }
        Action::ResetEdge(index) => {
            let name = edge_name(mutation, *index);
            mutation.reset_edge(&name)
        }
    }
}

/// Asserts the effect a successful call must have had.
fn assert_applied(mutation: &EntityMutation, action: &Action) {
    match action {
        Action::SetField(index, value) => {
            let name = field_name(mutation, *index);
            assert_eq!(mutation.field(&name), Some(value), "{action:?}");
            assert!(!mutation.field_cleared(&name));
            assert_eq!(mutation.added_field(&name), None);
        }
        Action::ClearField(index) => {
            let name = field_name(mutation, *index);
            assert!(mutation.field_cleared(&name), "{action:?}");
            assert_eq!(mutation.field(&name), None);
            assert_eq!(mutation.added_field(&name), None);
        }
        Action::AddField(index, _) => {
            let name = field_name(mutation, *index);
            assert!(mutation.added_field(&name).is_some(), "{action:?}");
            assert_eq!(mutation.field(&name), None);
            assert!(!mutation.field_cleared(&name));
        }
        Action::ResetField(index) => {
            let name = field_name(mutation, *index);
            assert_eq!(mutation.field(&name), None);
            assert!(!mutation.field_cleared(&name));
            assert_eq!(mutation.added_field(&name), None);
        }
        Action::AddEdgeIds(index, raw) => {
            let name = edge_name(mutation, *index);
            let added = mutation.added_ids(&name);
            let removed = mutation.removed_ids(&name);
            let is_to_one = mutation
                .schema()
                .edge(&name)
                .is_some_and(EdgeDescriptor::is_to_one);
            if is_to_one {
                assert_eq!(added, ids(raw), "{action:?}");
                assert!(!mutation.edge_cleared(&name));
            }
            for id in ids(raw) {
                assert!(added.contains(&id), "{action:?}");
                assert!(!removed.contains(&id), "{action:?}");
            }
        }
        Action::RemoveEdgeIds(index, raw) => {
            let name = edge_name(mutation, *index);
            let added = mutation.added_ids(&name);
            let removed = mutation.removed_ids(&name);
            for id in ids(raw) {
                assert!(removed.contains(&id), "{action:?}");
                assert!(!added.contains(&id), "{action:?}");
            }
        }
        Action::SetEdgeId(index, id) => {
            let name = edge_name(mutation, *index);
            assert_eq!(mutation.edge_id(&name), Some(Id(i64::from(*id))));
            assert!(!mutation.edge_cleared(&name));
        }
        Action::ClearEdge(index) => {
            let name = edge_name(mutation, *index);
            assert!(mutation.edge_cleared(&name), "{action:?}");
        }
        Action::ResetEdge(index) => {
            let name = edge_name(mutation, *index);
            assert!(mutation.added_ids(&name).is_empty());
            assert!(mutation.removed_ids(&name).is_empty());
            assert!(!mutation.edge_cleared(&name));
        }
    }
}

/// Asserts the invariants that hold after any sequence of calls.
fn assert_invariants(mutation: &EntityMutation) {
    let schema = mutation.schema();

    let mut expected_fields = Vec::new();
    for field in schema.fields() {
        let name = field.name();
        let value = mutation.field(name).is_some();
        let cleared = mutation.field_cleared(name);
        let delta = mutation.added_field(name).is_some();
        assert!(
            usize::from(value) + usize::from(cleared) + usize::from(delta) <= 1,
            "field {name} holds more than one pending state"
        );
        if cleared {
            assert!(field.is_nullable(), "non-nullable field {name} is cleared");
        }
        if delta {
            assert!(field.is_numeric(), "non-numeric field {name} has a delta");
        }
        if value || cleared {
            expected_fields.push(name);
        }
    }
    assert_eq!(mutation.fields(), expected_fields);

    for edge in schema.edges() {
        let name = edge.name();
        let added = mutation.added_ids(name);
        let removed = mutation.removed_ids(name);
        for id in &added {
            assert!(!removed.contains(id), "edge {name} adds and removes {id}");
        }
        if edge.is_to_one() {
            assert!(added.len() <= 1, "to-one edge {name} holds {added:?}");
            assert!(removed.is_empty(), "to-one edge {name} removes {removed:?}");
            if mutation.edge_cleared(name) {
                assert!(added.is_empty(), "cleared to-one edge {name} holds {added:?}");
            }
        }
        assert_eq!(
            mutation.added_edges().contains(&name),
            !added.is_empty(),
            "added_edges disagrees on {name}"
        );
        assert_eq!(
            mutation.removed_edges().contains(&name),
            !removed.is_empty(),
            "removed_edges disagrees on {name}"
        );
        assert_eq!(
            mutation.cleared_edges().contains(&name),
            mutation.edge_cleared(name),
            "cleared_edges disagrees on {name}"
        );
    }

    if mutation.op().is_delete() {
        assert!(mutation.is_empty(), "delete mutation carries state");
    }
}

/// Replays `script` against a fresh fixture mutation, asserting after every
/// call that:
///
/// - a failed call leaves the mutation unchanged
/// - a successful call has the documented effect
/// - a field holds at most one of value, clear and delta
/// - added and removed ids of an edge are disjoint
/// - a to-one edge holds at most one pending id
/// - a delete mutation never carries field or edge state
///
/// # Panics
///
/// Panics if any invariant is violated.
pub fn test_mutation_invariants(script: &MutationScript) {
    let client = widget_client();
    let entity = client
        .schema()
        .entity(WIDGET)
        .expect("fixture entity type is registered");
    let mut mutation = if script.op == Op::Create {
        Mutation::create(entity, client.clone())
    } else {
        Mutation::targeting(entity, script.op, 1, client.clone())
    };

    for action in &script.actions {
        let before = Snapshot::of(&mutation);
        match apply(&mut mutation, action) {
            Ok(()) => assert_applied(&mutation, action),
            Err(err) => {
                assert_eq!(
                    Snapshot::of(&mutation),
                    before,
                    "{action:?} failed with {err} but changed the mutation"
                );
                if script.op.is_delete() && action.is_setter() {
                    assert!(
                        matches!(err, Error::ReadOnlyOperation { .. }),
                        "{action:?} on {} failed with {err}",
                        script.op
                    );
                }
            }
        }
        assert_invariants(&mutation);
    }
}
