#![doc = include_str!("../README.md")]
#![no_std]
#![deny(clippy::mod_module_files)]

extern crate alloc;
#[cfg(feature = "testing")]
extern crate std;

pub mod client;
pub mod errors;
pub mod hook;
pub mod mutation;
pub mod op;
pub mod schema;
#[cfg(feature = "testing")]
pub mod testing;
pub mod value;

// Re-export main types
pub use client::{Client, EntityMutation, Tx, TxId};
pub use hook::{Hook, Hooks, Mutator};
pub use mutation::Mutation;
pub use op::{Op, Ops};
pub use schema::{
    Cardinality, EdgeDescriptor, EntitySchema, EntityType, EntityTypeBuilder, FieldDescriptor,
    FieldKind, Schema,
};
pub use value::{Id, Value};

// Re-export errors
pub use errors::Error;
