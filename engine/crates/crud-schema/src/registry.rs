//! The frozen output of schema assembly: generated input shapes, root fields with their bound
//! resolvers and the committed SDL.

mod export_sdl;
mod ids;

use std::sync::Arc;

use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use serde_json::Value;
use type_graph::{TypeGraph, TypeRef};

pub use self::ids::InputShapeId;
use crate::{
    config::CrudConfig,
    names::{IDENTIFIER_TYPE, TYPENAME_FIELD},
    resolvers::Resolver,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    graph: Arc<TypeGraph>,
    config: CrudConfig,
    input_shapes: Vec<InputShape>,
    query_fields: IndexMap<String, RootField>,
    mutation_fields: IndexMap<String, RootField>,
    type_resolvers: IndexMap<String, TypeResolver>,
    sdl: String,
}

/// The input counterpart of an object, interface or union, named `<Type>Input`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputShape {
    pub name: String,
    /// The type this shape was derived from.
    pub type_name: String,
    pub fields: IndexMap<String, InputField>,
}

/// A field of an input shape, or an argument of a root field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub ty: InputTypeRef,
    pub default_value: Option<ConstValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputTypeRef {
    /// A scalar, enum or input object of the source schema, or `ID`.
    Named(String),
    /// A generated input shape.
    Shape(InputShapeId),
    List(Box<InputTypeRef>),
    NonNull(Box<InputTypeRef>),
}

impl InputTypeRef {
    pub fn identifier() -> Self {
        InputTypeRef::Named(IDENTIFIER_TYPE.to_string())
    }

    /// Mirrors a type of the source schema whose named type is usable as an input.
    pub fn from_type_ref(graph: &TypeGraph, ty: &TypeRef) -> Self {
        match ty {
            TypeRef::Named(id) => InputTypeRef::Named(graph.walk(*id).name().to_string()),
            TypeRef::List(inner) => InputTypeRef::List(Box::new(Self::from_type_ref(graph, inner))),
            TypeRef::NonNull(inner) => InputTypeRef::NonNull(Box::new(Self::from_type_ref(graph, inner))),
        }
    }

    pub fn is_list(&self) -> bool {
        match self {
            InputTypeRef::Named(_) | InputTypeRef::Shape(_) => false,
            InputTypeRef::List(_) => true,
            InputTypeRef::NonNull(inner) => inner.is_list(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, InputTypeRef::NonNull(_))
    }

    /// Drops the outermost non-null modifier, if any.
    pub fn into_nullable(self) -> Self {
        match self {
            InputTypeRef::NonNull(inner) => *inner,
            other => other,
        }
    }

    pub fn shape(&self) -> Option<InputShapeId> {
        match self {
            InputTypeRef::Named(_) => None,
            InputTypeRef::Shape(id) => Some(*id),
            InputTypeRef::List(inner) | InputTypeRef::NonNull(inner) => inner.shape(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootField {
    pub name: String,
    /// Output type, in terms of the source schema.
    pub ty: TypeRef,
    pub arguments: IndexMap<String, InputField>,
    pub resolver: Resolver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// Picks the concrete type of a value returned for an interface or union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeResolver {
    /// The `__typename` marker carried by the value itself.
    Typename,
}

impl TypeResolver {
    pub fn resolve(self, value: &Value) -> Option<&str> {
        match self {
            TypeResolver::Typename => value.get(TYPENAME_FIELD).and_then(Value::as_str),
        }
    }
}

impl Registry {
    pub(crate) fn new(
        graph: Arc<TypeGraph>,
        config: CrudConfig,
        input_shapes: Vec<InputShape>,
        query_fields: IndexMap<String, RootField>,
        mutation_fields: IndexMap<String, RootField>,
        type_resolvers: IndexMap<String, TypeResolver>,
    ) -> Self {
        let mut registry = Self {
            graph,
            config,
            input_shapes,
            query_fields,
            mutation_fields,
            type_resolvers,
            sdl: String::new(),
        };

        registry.sdl = export_sdl::render(&registry);
        registry
    }

    pub fn graph(&self) -> &Arc<TypeGraph> {
        &self.graph
    }

    pub fn config(&self) -> &CrudConfig {
        &self.config
    }

    pub fn input_shapes(&self) -> impl ExactSizeIterator<Item = &InputShape> + '_ {
        self.input_shapes.iter()
    }

    pub fn input_shape(&self, name: &str) -> Option<&InputShape> {
        self.input_shapes.iter().find(|shape| shape.name == name)
    }

    pub fn query_fields(&self) -> &IndexMap<String, RootField> {
        &self.query_fields
    }

    pub fn mutation_fields(&self) -> &IndexMap<String, RootField> {
        &self.mutation_fields
    }

    pub fn root_field(&self, kind: OperationKind, name: &str) -> Option<&RootField> {
        match kind {
            OperationKind::Query => self.query_fields.get(name),
            OperationKind::Mutation => self.mutation_fields.get(name),
        }
    }

    pub fn root_type_name(&self, kind: OperationKind) -> &str {
        match kind {
            OperationKind::Query => &self.config.naming.query_type,
            OperationKind::Mutation => &self.config.naming.mutation_type,
        }
    }

    pub fn type_resolvers(&self) -> &IndexMap<String, TypeResolver> {
        &self.type_resolvers
    }

    /// The concrete type of `value`, returned for the interface or union `abstract_type`.
    pub fn resolve_type<'v>(&self, abstract_type: &str, value: &'v Value) -> Option<&'v str> {
        self.type_resolvers.get(abstract_type)?.resolve(value)
    }

    /// Renders an input type reference in SDL notation, e.g. `[TagInput!]`.
    pub fn render_input_type(&self, ty: &InputTypeRef) -> String {
        match ty {
            InputTypeRef::Named(name) => name.clone(),
            InputTypeRef::Shape(id) => self[*id].name.clone(),
            InputTypeRef::List(inner) => format!("[{}]", self.render_input_type(inner)),
            InputTypeRef::NonNull(inner) => format!("{}!", self.render_input_type(inner)),
        }
    }

    /// The committed schema: the source definitions followed by everything generated.
    pub fn sdl(&self) -> &str {
        &self.sdl
    }
}
