//! Submodule defining the errors used across the crate.

use alloc::string::String;

use crate::Op;

/// Errors raised while building schemas and mutations.
///
/// Every error is returned by the offending call; the mutation it was raised
/// against is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No entity type with this name is registered in the schema.
    #[error("unknown entity type {entity}")]
    UnknownEntityType {
        /// The requested entity type name.
        entity: String,
    },

    /// The field is not declared on the entity type.
    #[error("unknown {entity} field {field}")]
    UnknownField {
        /// The entity type of the mutation.
        entity: String,
        /// The requested field name.
        field: String,
    },

    /// The edge is not declared on the entity type.
    #[error("unknown {entity} edge {edge}")]
    UnknownEdge {
        /// The entity type of the mutation.
        entity: String,
        /// The requested edge name.
        edge: String,
    },

    /// The value does not match the declared kind of the field.
    #[error("unexpected {found} for {entity} field {field}, expected {expected}")]
    TypeMismatch {
        /// The entity type of the mutation.
        entity: String,
        /// The field name.
        field: String,
        /// The declared kind of the field.
        expected: &'static str,
        /// The kind of the provided value.
        found: &'static str,
    },

    /// A delta was applied to a field that is not numeric.
    #[error("unknown {entity} numeric field {field}")]
    NonNumericField {
        /// The entity type of the mutation.
        entity: String,
        /// The field name.
        field: String,
    },

    /// A clear was requested for a field that is not nullable.
    #[error("unknown {entity} nullable field {field}")]
    UnclearableField {
        /// The entity type of the mutation.
        entity: String,
        /// The field name.
        field: String,
    },

    /// The edge operation does not fit the declared cardinality of the edge.
    #[error("cannot {action} on {entity} edge {edge}")]
    InvalidCardinality {
        /// The entity type of the mutation.
        entity: String,
        /// The edge name.
        edge: String,
        /// The rejected action.
        action: &'static str,
    },

    /// The mutation was not built inside a transaction.
    #[error("mutation is not running in a transaction")]
    NotInTransaction,

    /// A transaction was requested from a transactional client.
    #[error("cannot start a transaction within a transaction")]
    NestedTransaction,

    /// A field or edge setter was called on a delete mutation.
    #[error("{op} mutation on {entity} carries no field or edge changes")]
    ReadOnlyOperation {
        /// The operation of the mutation.
        op: Op,
        /// The entity type of the mutation.
        entity: String,
    },

    /// The subject id of the mutation is already present.
    #[error("{op} mutation already has a subject id")]
    IdAlreadyAssigned {
        /// The operation of the mutation.
        op: Op,
    },

    /// Two fields with the same name were declared on one entity type.
    #[error("field {field} declared twice on {entity}")]
    DuplicateField {
        /// The entity type being built.
        entity: String,
        /// The duplicated field name.
        field: String,
    },

    /// Two edges with the same name were declared on one entity type.
    #[error("edge {edge} declared twice on {entity}")]
    DuplicateEdge {
        /// The entity type being built.
        entity: String,
        /// The duplicated edge name.
        edge: String,
    },

    /// Two entity types with the same name were registered in one schema.
    #[error("entity type {entity} registered twice")]
    DuplicateEntityType {
        /// The duplicated entity type name.
        entity: String,
    },

    /// A hook refused the operation.
    #[error("{op} operation is not allowed on {entity}")]
    OperationRejected {
        /// The operation of the mutation.
        op: Op,
        /// The entity type of the mutation.
        entity: String,
    },
}
