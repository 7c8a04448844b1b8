use type_graph::TypeGraphError;

use crate::storage::StorageError;

/// Schema assembly failures. Any of them aborts startup: no partial schema is published.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    SchemaIncomplete(#[from] TypeGraphError),
    #[error("The generated name `{name}` is already in use.")]
    NamingCollision { name: String },
}

/// Failures of a single root field. They are reported to the caller of that field and leave
/// every other operation unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error(
        "Bad mutation: the input for `{type_name}` carries no new data. Reference existing records with the `Id` or `Ids` fields instead of a nested input."
    )]
    EmptyMutation { type_name: String },
    #[error("Bad mutation: both `{key}` and `{field}` are set for the relation `{field}`, only one of them may be.")]
    ConflictingRelationArgument { field: String, key: String },
    #[error("Bad mutation: exactly one member of `{type_name}` must be provided for `{field}`.")]
    AmbiguousPolymorphicInput { field: String, type_name: String },
    #[error("Invalid value for argument `{name}`: {message}")]
    InvalidArgument { name: String, message: String },
    #[error("Unknown field `{name}` on type `{type_name}`.")]
    UnknownField { name: String, type_name: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
