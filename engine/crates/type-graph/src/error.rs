use std::path::PathBuf;

/// Failures while obtaining or ingesting a schema. All of them are fatal: nothing can be generated
/// from an incomplete type graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeGraphError {
    #[error("Could not parse the schema: {0}")]
    Parse(String),
    #[error("Could not read the schema at {}: {message}", path.display())]
    Read { path: PathBuf, message: String },
    #[error("The type `{name}` is defined more than once.")]
    DuplicateDefinition { name: String },
    #[error("The type `{name}` referenced by `{referenced_by}` is not defined.")]
    UnknownType { name: String, referenced_by: String },
}
