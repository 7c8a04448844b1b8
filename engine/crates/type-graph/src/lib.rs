//! An immutable, arena-backed view of a GraphQL type schema.
//!
//! The graph is ingested once from SDL and then only read. Definitions and fields live in flat
//! vectors addressed by [`DefinitionId`] and [`FieldId`], and are navigated through [`Walker`]s.

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod error;
mod ids;
mod ingest;
mod sdl;
mod source;
mod walkers;

use std::collections::HashMap;

use async_graphql_value::ConstValue;

pub use self::{
    error::TypeGraphError,
    ids::{DefinitionId, FieldId},
    source::{SchemaSource, SdlSource},
    walkers::{DefinitionWalker, FieldWalker, Walker},
};

pub const BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

/// The set of named types of a schema along with their fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TypeGraph {
    definitions: Vec<Definition>,
    fields: Vec<Field>,
    definition_names: HashMap<String, DefinitionId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    name: String,
    description: Option<String>,
    kind: DefinitionKind,
    builtin: bool,
    /// Fields of objects, interfaces and input objects, in declaration order.
    fields: Vec<FieldId>,
    /// Interfaces implemented by an object or interface.
    implements: Vec<DefinitionId>,
    /// Union members, or the objects implementing an interface.
    possible_types: Vec<DefinitionId>,
    enum_values: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Scalar,
    Enum,
    InputObject,
    Object,
    Interface,
    Union,
}

impl DefinitionKind {
    /// Objects, interfaces and unions: the kinds a relation can point to.
    pub fn is_composite(self) -> bool {
        match self {
            DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union => true,
            DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject => false,
        }
    }

    /// Kinds that can be used as-is in an input position.
    pub fn is_input(self) -> bool {
        match self {
            DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject => true,
            DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    parent: DefinitionId,
    name: String,
    description: Option<String>,
    ty: TypeRef,
    arguments: Vec<InputValue>,
    /// Declared with `@default(value: ...)` on output fields, or the default of an input field.
    default_value: Option<ConstValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    pub default_value: Option<ConstValue>,
}

/// A reference to a named type, possibly wrapped in list and non-null modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(DefinitionId),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named_type(&self) -> DefinitionId {
        match self {
            TypeRef::Named(id) => *id,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            TypeRef::Named(_) => false,
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => inner.is_list(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }
}

/// Answers whether a field of a type is a relation to another entity type, and to which one.
pub trait RelationLinks {
    fn relation_link(&self, type_name: &str, field_name: &str) -> Option<&str>;
}

impl TypeGraph {
    pub fn from_sdl(sdl: &str) -> Result<Self, TypeGraphError> {
        let document = async_graphql_parser::parse_schema(sdl).map_err(|error| TypeGraphError::Parse(error.to_string()))?;
        let graph = ingest::ingest(&document)?;

        tracing::debug!(
            definitions = graph.definitions.len(),
            fields = graph.fields.len(),
            "ingested type graph"
        );

        Ok(graph)
    }

    pub fn walk<Id>(&self, id: Id) -> Walker<'_, Id> {
        Walker { id, graph: self }
    }

    pub fn definitions(&self) -> impl Iterator<Item = DefinitionWalker<'_>> + '_ {
        (0..self.definitions.len()).map(|idx| self.walk(DefinitionId::from(idx)))
    }

    pub fn definition_by_name(&self, name: &str) -> Option<DefinitionWalker<'_>> {
        self.definition_names.get(name).map(|id| self.walk(*id))
    }

    /// Like [`TypeGraph::definition_by_name`], for lookups that the rest of the schema depends on.
    pub fn require_definition(&self, name: &str, referenced_by: &str) -> Result<DefinitionWalker<'_>, TypeGraphError> {
        self.definition_by_name(name).ok_or_else(|| TypeGraphError::UnknownType {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }

    /// The objects implementing the marker interface, in declaration order. `None` when the
    /// interface is not declared.
    pub fn node_types(&self, marker_interface: &str) -> Option<Vec<DefinitionWalker<'_>>> {
        let marker = self.definition_by_name(marker_interface)?;

        match marker.kind() {
            DefinitionKind::Interface => Some(marker.possible_types().collect()),
            DefinitionKind::Scalar
            | DefinitionKind::Enum
            | DefinitionKind::InputObject
            | DefinitionKind::Object
            | DefinitionKind::Union => None,
        }
    }

    pub fn type_name(&self, ty: &TypeRef) -> &str {
        &self[ty.named_type()].name
    }

    /// Renders a type reference in SDL notation, e.g. `[Post!]!`.
    pub fn render_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named(id) => self[*id].name.clone(),
            TypeRef::List(inner) => format!("[{}]", self.render_type(inner)),
            TypeRef::NonNull(inner) => format!("{}!", self.render_type(inner)),
        }
    }

    pub fn to_sdl(&self) -> String {
        sdl::render(self)
    }
}

impl RelationLinks for TypeGraph {
    fn relation_link(&self, type_name: &str, field_name: &str) -> Option<&str> {
        self.definition_by_name(type_name)?
            .field_by_name(field_name)?
            .linked_type()
            .map(|definition| definition.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        interface Node {
            id: ID!
        }

        type Company implements Node {
            id: ID!
            name: String!
        }

        type User implements Node {
            id: ID!
            name: String! @default(value: "anonymous")
            company: Company
            posts: [Post!]!
        }

        type Post implements Node {
            id: ID!
            title: String!
            author: User!
        }

        union SearchResult = User | Post
    "#;

    #[test]
    fn node_types_follow_declaration_order() {
        let graph = TypeGraph::from_sdl(SCHEMA).unwrap();

        let names = graph
            .node_types("Node")
            .unwrap()
            .into_iter()
            .map(|definition| definition.name())
            .collect::<Vec<_>>();

        assert_eq!(names, ["Company", "User", "Post"]);
        assert!(graph.node_types("Entity").is_none());
        assert!(graph.node_types("Company").is_none());
    }

    #[test]
    fn relation_links() {
        let graph = TypeGraph::from_sdl(SCHEMA).unwrap();

        assert_eq!(graph.relation_link("Post", "author"), Some("User"));
        assert_eq!(graph.relation_link("User", "posts"), Some("Post"));
        assert_eq!(graph.relation_link("User", "company"), Some("Company"));
        assert_eq!(graph.relation_link("User", "name"), None);
        assert_eq!(graph.relation_link("User", "missing"), None);
        assert_eq!(graph.relation_link("Missing", "name"), None);
    }

    #[test]
    fn type_rendering_keeps_wrappers() {
        let graph = TypeGraph::from_sdl(SCHEMA).unwrap();
        let posts = graph.definition_by_name("User").unwrap().field_by_name("posts").unwrap();

        assert_eq!(graph.render_type(posts.ty()), "[Post!]!");
        assert!(posts.ty().is_list());
        assert!(posts.ty().is_required());
        assert_eq!(graph.type_name(posts.ty()), "Post");
    }

    #[test]
    fn default_directive_is_recorded() {
        let graph = TypeGraph::from_sdl(SCHEMA).unwrap();
        let name = graph.definition_by_name("User").unwrap().field_by_name("name").unwrap();

        assert_eq!(name.default_value(), Some(&ConstValue::String("anonymous".into())));
    }

    #[test]
    fn union_members() {
        let graph = TypeGraph::from_sdl(SCHEMA).unwrap();
        let union = graph.definition_by_name("SearchResult").unwrap();

        assert_eq!(union.kind(), DefinitionKind::Union);
        assert_eq!(
            union.possible_types().map(|ty| ty.name()).collect::<Vec<_>>(),
            ["User", "Post"]
        );
    }

    #[test]
    fn unknown_type_is_fatal() {
        let error = TypeGraph::from_sdl("type Post { author: User }").unwrap_err();

        assert_eq!(
            error,
            TypeGraphError::UnknownType {
                name: "User".into(),
                referenced_by: "Post.author".into()
            }
        );
    }

    #[test]
    fn duplicate_definition_is_fatal() {
        let error = TypeGraph::from_sdl("type Post { id: ID } type Post { id: ID }").unwrap_err();

        assert_eq!(error, TypeGraphError::DuplicateDefinition { name: "Post".into() });
    }
}
