//! The hand-off of finished mutations to the persistence engine.
//!
//! A [`Mutator`] consumes a mutation by value, so each mutation reaches storage
//! at most once. [`Hooks`] run before the mutator, in registration order, and
//! may inspect or amend the mutation or refuse it.
//!
//! # Example
//!
//! ```
//! use graph_changeset::hook::{self, Hooks};
//! use graph_changeset::{Client, EntityMutation, EntityType, Error, FieldDescriptor, FieldKind, Op, Schema};
//!
//! let user = EntityType::builder("User")
//!     .field(FieldDescriptor::new("email", FieldKind::String))
//!     .field(FieldDescriptor::new("logins", FieldKind::Int))
//!     .build()
//!     .unwrap();
//! let client = Client::new(Schema::from_entities([user]).unwrap());
//!
//! let mut hooks = Hooks::new();
//! hooks
//!     .use_hook(hook::reject(Op::Delete | Op::DeleteOne))
//!     .use_hook(hook::on(
//!         |m: &mut EntityMutation| m.set_field("logins", 0),
//!         Op::Create,
//!     ));
//!
//! let mut written = Vec::new();
//! let mut engine = |m: EntityMutation| -> Result<usize, Error> {
//!     written.push(m.fields().len());
//!     Ok(written.len())
//! };
//!
//! let mut create = client.create("User").unwrap();
//! create.set_field("email", "a@b.c").unwrap();
//! assert_eq!(hooks.run(create, &mut engine), Ok(1));
//!
//! let delete = client.delete_one("User", 1).unwrap();
//! assert!(hooks.run(delete, &mut engine).is_err());
//! assert_eq!(written, [2]);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Debug};

use crate::errors::Error;
use crate::{EntitySchema, Mutation, Ops};

/// Consumer of finished mutations, typically the persistence engine.
pub trait Mutator<T: EntitySchema> {
    /// What a successful write returns.
    type Output;
    /// The failure type; hook errors convert into it.
    type Error: From<Error>;

    /// Writes the mutation.
    ///
    /// # Errors
    ///
    /// Whatever the engine reports for the write.
    fn mutate(&mut self, mutation: Mutation<T>) -> Result<Self::Output, Self::Error>;
}

impl<T, F, O, E> Mutator<T> for F
where
    T: EntitySchema,
    F: FnMut(Mutation<T>) -> Result<O, E>,
    E: From<Error>,
{
    type Output = O;
    type Error = E;

    #[inline]
    fn mutate(&mut self, mutation: Mutation<T>) -> Result<O, E> {
        self(mutation)
    }
}

/// Logic run against a mutation before it reaches the mutator.
pub trait Hook<T: EntitySchema> {
    /// Inspects or amends the mutation.
    ///
    /// # Errors
    ///
    /// An error stops the chain; the mutation is dropped unwritten.
    fn run(&self, mutation: &mut Mutation<T>) -> Result<(), Error>;
}

impl<T, F> Hook<T> for F
where
    T: EntitySchema,
    F: Fn(&mut Mutation<T>) -> Result<(), Error>,
{
    #[inline]
    fn run(&self, mutation: &mut Mutation<T>) -> Result<(), Error> {
        self(mutation)
    }
}

/// A predicate over a mutation, used with [`when`].
pub trait Condition<T: EntitySchema> {
    /// Returns whether the mutation satisfies the condition.
    fn check(&self, mutation: &Mutation<T>) -> bool;
}

impl<T, F> Condition<T> for F
where
    T: EntitySchema,
    F: Fn(&Mutation<T>) -> bool,
{
    #[inline]
    fn check(&self, mutation: &Mutation<T>) -> bool {
        self(mutation)
    }
}

/// An ordered chain of hooks.
pub struct Hooks<T: EntitySchema> {
    hooks: Vec<Box<dyn Hook<T>>>,
}

impl<T: EntitySchema> Default for Hooks<T> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<T: EntitySchema> Debug for Hooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}

impl<T: EntitySchema> Hooks<T> {
    /// Creates an empty chain.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook; hooks run in the order they were added.
    pub fn use_hook(&mut self, hook: impl Hook<T> + 'static) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Returns the number of hooks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns whether the chain is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook on the mutation, then hands it to `mutator`.
    ///
    /// # Errors
    ///
    /// The first hook error, converted into the mutator's error type, or the
    /// mutator's own error.
    pub fn run<M: Mutator<T>>(
        &self,
        mut mutation: Mutation<T>,
        mutator: &mut M,
    ) -> Result<M::Output, M::Error> {
        for hook in &self.hooks {
            hook.run(&mut mutation)?;
        }
        tracing::debug!(
            entity = mutation.type_name(),
            op = %mutation.op(),
            fields = mutation.fields().len(),
            added_fields = mutation.added_fields().len(),
            edges = mutation.touched_edges().count(),
            "handing mutation to mutator"
        );
        mutator.mutate(mutation)
    }
}

/// Hook restricted to a set of operations, built by [`on`].
#[derive(Debug, Clone, Copy)]
pub struct On<H> {
    hook: H,
    ops: Ops,
}

/// Runs `hook` only for mutations whose operation is in `ops`.
#[must_use]
pub fn on<H>(hook: H, ops: impl Into<Ops>) -> On<H> {
    On {
        hook,
        ops: ops.into(),
    }
}

impl<T: EntitySchema, H: Hook<T>> Hook<T> for On<H> {
    fn run(&self, mutation: &mut Mutation<T>) -> Result<(), Error> {
        if mutation.op().is(self.ops) {
            self.hook.run(mutation)
        } else {
            Ok(())
        }
    }
}

/// Hook refusing a set of operations, built by [`reject`].
#[derive(Debug, Clone, Copy)]
pub struct Reject {
    ops: Ops,
}

/// Refuses every mutation whose operation is in `ops`.
#[must_use]
pub fn reject(ops: impl Into<Ops>) -> Reject {
    Reject { ops: ops.into() }
}

impl<T: EntitySchema> Hook<T> for Reject {
    fn run(&self, mutation: &mut Mutation<T>) -> Result<(), Error> {
        if mutation.op().is(self.ops) {
            return Err(Error::OperationRejected {
                op: mutation.op(),
                entity: mutation.type_name().into(),
            });
        }
        Ok(())
    }
}

/// Hook guarded by a condition, built by [`when`].
#[derive(Debug, Clone, Copy)]
pub struct When<H, C> {
    hook: H,
    condition: C,
}

/// Runs `hook` only when `condition` holds for the mutation.
#[must_use]
pub fn when<H, C>(hook: H, condition: C) -> When<H, C> {
    When { hook, condition }
}

impl<T: EntitySchema, H: Hook<T>, C: Condition<T>> Hook<T> for When<H, C> {
    fn run(&self, mutation: &mut Mutation<T>) -> Result<(), Error> {
        if self.condition.check(mutation) {
            self.hook.run(mutation)
        } else {
            Ok(())
        }
    }
}

/// Holds when the operation is in `ops`.
pub fn has_op<T: EntitySchema>(ops: impl Into<Ops>) -> impl Condition<T> {
    let ops = ops.into();
    move |mutation: &Mutation<T>| mutation.op().is(ops)
}

/// Holds when every named field has a pending value.
pub fn has_fields<T: EntitySchema>(names: &'static [&'static str]) -> impl Condition<T> {
    move |mutation: &Mutation<T>| names.iter().all(|name| mutation.field(name).is_some())
}

/// Holds when every named field has a pending delta.
pub fn has_added_fields<T: EntitySchema>(names: &'static [&'static str]) -> impl Condition<T> {
    move |mutation: &Mutation<T>| {
        names
            .iter()
            .all(|name| mutation.added_field(name).is_some())
    }
}

/// Holds when every named field is pending a clear.
pub fn has_cleared_fields<T: EntitySchema>(names: &'static [&'static str]) -> impl Condition<T> {
    move |mutation: &Mutation<T>| names.iter().all(|name| mutation.field_cleared(name))
}

/// Holds when every named edge has ids pending attachment.
pub fn has_added_edges<T: EntitySchema>(names: &'static [&'static str]) -> impl Condition<T> {
    move |mutation: &Mutation<T>| {
        names
            .iter()
            .all(|name| !mutation.added_ids(name).is_empty())
    }
}

/// Negates a condition.
pub fn not<T: EntitySchema>(condition: impl Condition<T>) -> impl Condition<T> {
    move |mutation: &Mutation<T>| !condition.check(mutation)
}
