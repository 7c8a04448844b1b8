use async_graphql_value::ConstValue;

use crate::{DefinitionId, DefinitionKind, FieldId, InputValue, TypeGraph, TypeRef};

/// An id paired with the graph it belongs to.
#[derive(Clone, Copy)]
pub struct Walker<'a, Id> {
    pub(crate) id: Id,
    pub(crate) graph: &'a TypeGraph,
}

impl<'a, Id> Walker<'a, Id> {
    pub fn walk<OtherId>(self, other: OtherId) -> Walker<'a, OtherId> {
        self.graph.walk(other)
    }

    pub fn graph(&self) -> &'a TypeGraph {
        self.graph
    }
}

impl<'a, Id: Copy> Walker<'a, Id> {
    pub fn id(&self) -> Id {
        self.id
    }
}

pub type DefinitionWalker<'a> = Walker<'a, DefinitionId>;

impl<'a> DefinitionWalker<'a> {
    pub fn name(self) -> &'a str {
        &self.graph[self.id].name
    }

    pub fn description(self) -> Option<&'a str> {
        self.graph[self.id].description.as_deref()
    }

    pub fn kind(self) -> DefinitionKind {
        self.graph[self.id].kind
    }

    pub fn is_builtin(self) -> bool {
        self.graph[self.id].builtin
    }

    /// Fields of an object, interface or input object. Empty for other kinds.
    pub fn fields(self) -> impl ExactSizeIterator<Item = FieldWalker<'a>> + 'a {
        let graph = self.graph;
        graph[self.id].fields.iter().map(move |id| graph.walk(*id))
    }

    pub fn field_by_name(self, name: &str) -> Option<FieldWalker<'a>> {
        self.fields().find(|field| field.name() == name)
    }

    pub fn implements(self) -> impl ExactSizeIterator<Item = DefinitionWalker<'a>> + 'a {
        let graph = self.graph;
        graph[self.id].implements.iter().map(move |id| graph.walk(*id))
    }

    /// Union members, or the objects implementing an interface.
    pub fn possible_types(self) -> impl ExactSizeIterator<Item = DefinitionWalker<'a>> + 'a {
        let graph = self.graph;
        graph[self.id].possible_types.iter().map(move |id| graph.walk(*id))
    }

    pub fn enum_values(self) -> impl ExactSizeIterator<Item = &'a str> + 'a {
        self.graph[self.id].enum_values.iter().map(String::as_str)
    }
}

impl std::fmt::Debug for DefinitionWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

pub type FieldWalker<'a> = Walker<'a, FieldId>;

impl<'a> FieldWalker<'a> {
    pub fn name(self) -> &'a str {
        &self.graph[self.id].name
    }

    pub fn description(self) -> Option<&'a str> {
        self.graph[self.id].description.as_deref()
    }

    pub fn parent(self) -> DefinitionWalker<'a> {
        self.walk(self.graph[self.id].parent)
    }

    pub fn ty(self) -> &'a TypeRef {
        &self.graph[self.id].ty
    }

    /// The named type at the bottom of the field's list and non-null wrappers.
    pub fn named_type(self) -> DefinitionWalker<'a> {
        self.walk(self.ty().named_type())
    }

    pub fn arguments(self) -> &'a [InputValue] {
        &self.graph[self.id].arguments
    }

    pub fn default_value(self) -> Option<&'a ConstValue> {
        self.graph[self.id].default_value.as_ref()
    }

    /// The entity type this field relates to, if it is a relation.
    pub fn linked_type(self) -> Option<DefinitionWalker<'a>> {
        let named_type = self.named_type();
        named_type.kind().is_composite().then_some(named_type)
    }
}

impl std::fmt::Debug for FieldWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("parent", &self.parent().name())
            .field("name", &self.name())
            .field("type", &self.graph.render_type(self.ty()))
            .finish()
    }
}
