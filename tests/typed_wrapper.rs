//! A typed entity wrapper and an in-memory engine driven through hooks.
//!
//! The wrapper shows how per-entity setters sit on top of the generic
//! mutation without duplicating its dirty tracking. The engine walks finished
//! mutations only through the name-based accessors.

use std::collections::BTreeMap;

use graph_changeset::hook::{self, Hooks};
use graph_changeset::{
    Client, EdgeDescriptor, EntityMutation, EntityType, Error, FieldDescriptor, FieldKind, Id,
    Mutator, Op, Ops, Schema, Value,
};

// =============================================================================
// Typed wrapper
// =============================================================================

struct WidgetMutation(EntityMutation);

impl WidgetMutation {
    fn set_name(&mut self, name: &str) -> &mut Self {
        self.0.set_field("name", name).unwrap();
        self
    }

    fn set_price(&mut self, price: i64) -> &mut Self {
        self.0.set_field("price", price).unwrap();
        self
    }

    fn add_price(&mut self, delta: i64) -> &mut Self {
        self.0.add_field("price", delta).unwrap();
        self
    }

    fn clear_note(&mut self) -> &mut Self {
        self.0.clear_field("note").unwrap();
        self
    }

    fn add_tag_ids(&mut self, ids: &[i64]) -> &mut Self {
        self.0.add_edge_ids("tags", ids.iter().copied()).unwrap();
        self
    }

    fn remove_tag_ids(&mut self, ids: &[i64]) -> &mut Self {
        self.0.remove_edge_ids("tags", ids.iter().copied()).unwrap();
        self
    }

    fn set_owner_id(&mut self, id: i64) -> &mut Self {
        self.0.set_edge_id("owner", id).unwrap();
        self
    }

    fn name(&self) -> Option<&str> {
        self.0.field("name").and_then(Value::as_str)
    }

    fn into_inner(self) -> EntityMutation {
        self.0
    }
}

fn client() -> Client {
    let widget = EntityType::builder("Widget")
        .field(FieldDescriptor::new("name", FieldKind::String))
        .field(FieldDescriptor::new("price", FieldKind::Int))
        .field(FieldDescriptor::new("note", FieldKind::String).nullable())
        .field(FieldDescriptor::new("version", FieldKind::Int))
        .edge(EdgeDescriptor::to_many("tags", "Tag"))
        .edge(EdgeDescriptor::to_one("owner", "User"))
        .build()
        .unwrap();
    Client::new(Schema::from_entities([widget]).unwrap())
}

// =============================================================================
// In-memory engine
// =============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct Row {
    fields: BTreeMap<String, Value>,
    edges: BTreeMap<String, Vec<Id>>,
}

#[derive(Default)]
struct Engine {
    rows: BTreeMap<Id, Row>,
    next_id: i64,
}

impl Engine {
    fn apply_edges(row: &mut Row, mutation: &EntityMutation) {
        for name in mutation.cleared_edges() {
            row.edges.remove(name);
        }
        for name in mutation.removed_edges() {
            let removed = mutation.removed_ids(name);
            if let Some(ids) = row.edges.get_mut(name) {
                ids.retain(|id| !removed.contains(id));
            }
        }
        for name in mutation.added_edges() {
            let ids = row.edges.entry(name.to_string()).or_default();
            for id in mutation.added_ids(name) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
}

impl Mutator<std::sync::Arc<EntityType>> for Engine {
    type Output = Id;
    type Error = Error;

    fn mutate(&mut self, mut mutation: EntityMutation) -> Result<Id, Error> {
        if mutation.op() == Op::Create {
            self.next_id += 1;
            mutation.assign_id(self.next_id)?;
        }
        let Some(id) = mutation.id() else {
            unreachable!("created mutations are assigned an id above");
        };

        if mutation.op().is_delete() {
            self.rows.remove(&id);
            return Ok(id);
        }

        let row = self.rows.entry(id).or_default();
        for name in mutation.fields() {
            match mutation.field(name) {
                Some(value) => {
                    row.fields.insert(name.to_string(), value.clone());
                }
                None => {
                    row.fields.remove(name);
                }
            }
        }
        for name in mutation.added_fields() {
            let Some(Value::Int(delta)) = mutation.added_field(name) else {
                continue;
            };
            let current = row
                .fields
                .get(name)
                .and_then(Value::as_int)
                .unwrap_or_default();
            row.fields
                .insert(name.to_string(), Value::Int(current + delta));
        }
        Self::apply_edges(row, &mutation);
        Ok(id)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_typed_setters_feed_generic_accessors() {
    let client = client();
    let mut widget = WidgetMutation(client.create("Widget").unwrap());
    widget.set_name("a").set_price(10).add_tag_ids(&[5, 6]);

    assert_eq!(widget.name(), Some("a"));
    let mutation = widget.into_inner();
    assert_eq!(mutation.fields(), ["name", "price"]);
    assert_eq!(mutation.added_ids("tags"), [Id(5), Id(6)]);
}

#[test]
fn test_engine_applies_create_update_delete() {
    let client = client();
    let hooks = Hooks::new();
    let mut engine = Engine::default();

    let mut create = WidgetMutation(client.create("Widget").unwrap());
    create
        .set_name("gear")
        .set_price(10)
        .add_tag_ids(&[1, 2, 3])
        .set_owner_id(7);
    let id = hooks.run(create.into_inner(), &mut engine).unwrap();
    assert_eq!(id, Id(1));

    let mut update = WidgetMutation(client.update_one("Widget", id).unwrap());
    update.add_price(5).clear_note().remove_tag_ids(&[2]);
    hooks.run(update.into_inner(), &mut engine).unwrap();

    let row = &engine.rows[&id];
    assert_eq!(row.fields["name"], Value::from("gear"));
    assert_eq!(row.fields["price"], Value::Int(15));
    assert!(!row.fields.contains_key("note"));
    assert_eq!(row.edges["tags"], [Id(1), Id(3)]);
    assert_eq!(row.edges["owner"], [Id(7)]);

    let delete = client.delete_one("Widget", id).unwrap();
    hooks.run(delete, &mut engine).unwrap();
    assert!(engine.rows.is_empty());
}

#[test]
fn test_hooks_amend_and_guard_mutations() {
    let client = client();
    let mut hooks = Hooks::new();
    hooks
        .use_hook(hook::on(
            |m: &mut EntityMutation| m.add_field("version", 1),
            Ops::UPDATES,
        ))
        .use_hook(hook::on(
            |m: &mut EntityMutation| m.set_field("version", 1),
            Op::Create,
        ))
        .use_hook(hook::reject(Op::Delete));
    let mut engine = Engine::default();

    let mut create = WidgetMutation(client.create("Widget").unwrap());
    create.set_name("gear").set_price(1);
    let id = hooks.run(create.into_inner(), &mut engine).unwrap();

    for _ in 0..2 {
        let mut update = WidgetMutation(client.update("Widget", id).unwrap());
        update.set_price(2);
        hooks.run(update.into_inner(), &mut engine).unwrap();
    }
    assert_eq!(engine.rows[&id].fields["version"], Value::Int(3));

    let err = hooks
        .run(client.delete("Widget", id).unwrap(), &mut engine)
        .unwrap_err();
    assert_eq!(
        err,
        Error::OperationRejected {
            op: Op::Delete,
            entity: "Widget".into(),
        }
    );
    assert!(engine.rows.contains_key(&id));

    hooks
        .run(client.delete_one("Widget", id).unwrap(), &mut engine)
        .unwrap();
    assert!(engine.rows.is_empty());
}

#[test]
fn test_hook_sees_transaction() {
    let client = client();
    let tx = client.begin().unwrap();
    let tx_id = tx.id();

    let mut hooks = Hooks::new();
    hooks.use_hook(move |m: &mut EntityMutation| -> Result<(), Error> {
        assert_eq!(m.tx()?.id(), tx_id);
        Ok(())
    });
    let mut engine = Engine::default();

    let mut create = WidgetMutation(tx.create("Widget").unwrap());
    create.set_name("in-tx").set_price(1);
    assert!(hooks.run(create.into_inner(), &mut engine).is_ok());

    let outside = client.create("Widget").unwrap();
    assert_eq!(
        hooks.run(outside, &mut engine).unwrap_err(),
        Error::NotInTransaction
    );
}
