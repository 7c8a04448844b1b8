use std::path::PathBuf;

use crate::{TypeGraph, TypeGraphError};

/// Where the type graph comes from. Loaded once, at startup.
pub trait SchemaSource {
    fn load(&self) -> Result<TypeGraph, TypeGraphError>;
}

/// GraphQL SDL, either inline or in a file.
#[derive(Debug, Clone)]
pub enum SdlSource {
    Inline(String),
    File(PathBuf),
}

impl SchemaSource for SdlSource {
    fn load(&self) -> Result<TypeGraph, TypeGraphError> {
        match self {
            SdlSource::Inline(sdl) => TypeGraph::from_sdl(sdl),
            SdlSource::File(path) => {
                tracing::debug!(path = %path.display(), "loading schema");

                let sdl = std::fs::read_to_string(path).map_err(|error| TypeGraphError::Read {
                    path: path.clone(),
                    message: error.to_string(),
                })?;

                TypeGraph::from_sdl(&sdl)
            }
        }
    }
}

impl SchemaSource for TypeGraph {
    fn load(&self) -> Result<TypeGraph, TypeGraphError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_error() {
        let error = SdlSource::File(PathBuf::from("/definitely/not/here.graphql"))
            .load()
            .unwrap_err();

        assert!(matches!(error, TypeGraphError::Read { .. }), "{error}");
    }

    #[test]
    fn inline_source() {
        let graph = SdlSource::Inline("type Post { id: ID! }".into()).load().unwrap();

        assert!(graph.definition_by_name("Post").is_some());
    }
}
