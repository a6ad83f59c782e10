//! Entity type metadata consumed by mutations.
//!
//! The schema layer declares, per entity type, the ordered fields and edges a
//! mutation may touch. Mutations only ever read it.
mod edge;
mod entity_schema;
mod entity_type;
mod field;
mod registry;

pub use edge::{Cardinality, EdgeDescriptor};
pub use entity_schema::EntitySchema;
pub use entity_type::{EntityType, EntityTypeBuilder};
pub use field::{FieldDescriptor, FieldKind};
pub use registry::Schema;
