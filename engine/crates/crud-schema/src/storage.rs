//! The storage collaborator: executes creates and reads for the generated resolvers.

mod memory;

use std::fmt;

use serde_json::{Map, Value};
use type_graph::RelationLinks;

pub use self::memory::{MemoryStorage, StorageCall};

/// Where records are created and read. Implementations also answer which fields are relations,
/// since eager-loading follows the storage's own idea of links.
#[async_trait::async_trait]
pub trait Storage: RelationLinks + Send + Sync {
    /// Creates a record of `type_name`. `args` holds literal values and identifiers of related
    /// records under their field names. Returns the created record, identifier included.
    async fn create(&self, type_name: &str, args: Map<String, Value>) -> Result<Value, StorageError>;

    /// Reads records of `type_name`, all of them when `ids` is `None`, and eager-loads the
    /// relations along every include path.
    async fn find(
        &self,
        type_name: &str,
        ids: Option<&[Value]>,
        filter: Option<&Value>,
        includes: &[IncludePath],
    ) -> Result<Value, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unknown record type `{type_name}`.")]
    UnknownType { type_name: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One chain of relation fields to eager-load, e.g. `author.company`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IncludePath(Vec<String>);

impl IncludePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[&str; N]> for IncludePath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|segment| segment.to_string()).collect())
    }
}

impl fmt::Display for IncludePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
