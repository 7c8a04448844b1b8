//! SDL ingestion. Two passes: every named definition is registered first so that bodies can refer
//! to types declared later in the document, then bodies are ingested and references resolved.

use async_graphql_parser::types as ast;
use async_graphql_value::ConstValue;

use crate::{
    Definition, DefinitionId, DefinitionKind, Field, FieldId, InputValue, TypeGraph, TypeGraphError, TypeRef,
    BUILTIN_SCALARS,
};

pub(crate) const DEFAULT_DIRECTIVE: &str = "default";
pub(crate) const VALUE_ARGUMENT: &str = "value";

pub(crate) fn ingest(document: &ast::ServiceDocument) -> Result<TypeGraph, TypeGraphError> {
    let mut graph = TypeGraph::default();

    for scalar in BUILTIN_SCALARS {
        graph.push_definition(scalar, None, DefinitionKind::Scalar, true);
    }

    ingest_top_level_definitions(document, &mut graph)?;
    ingest_definition_bodies(document, &mut graph)?;
    graph.collect_possible_types();

    Ok(graph)
}

fn type_definitions(document: &ast::ServiceDocument) -> impl Iterator<Item = &ast::TypeDefinition> {
    document.definitions.iter().filter_map(|definition| match definition {
        ast::TypeSystemDefinition::Type(ty) => Some(&ty.node),
        ast::TypeSystemDefinition::Schema(_) | ast::TypeSystemDefinition::Directive(_) => None,
    })
}

fn ingest_top_level_definitions(document: &ast::ServiceDocument, graph: &mut TypeGraph) -> Result<(), TypeGraphError> {
    for definition in type_definitions(document).filter(|definition| !definition.extend) {
        let name = definition.name.node.as_str();
        let kind = match &definition.kind {
            ast::TypeKind::Scalar => DefinitionKind::Scalar,
            ast::TypeKind::Object(_) => DefinitionKind::Object,
            ast::TypeKind::Interface(_) => DefinitionKind::Interface,
            ast::TypeKind::Union(_) => DefinitionKind::Union,
            ast::TypeKind::Enum(_) => DefinitionKind::Enum,
            ast::TypeKind::InputObject(_) => DefinitionKind::InputObject,
        };

        if let Some(existing) = graph.definition_by_name(name) {
            // Redeclaring a built-in scalar is allowed and changes nothing.
            if existing.is_builtin() && kind == DefinitionKind::Scalar {
                continue;
            }

            return Err(TypeGraphError::DuplicateDefinition { name: name.to_string() });
        }

        let description = definition.description.as_ref().map(|description| description.node.clone());
        graph.push_definition(name, description, kind, false);
    }

    Ok(())
}

fn ingest_definition_bodies(document: &ast::ServiceDocument, graph: &mut TypeGraph) -> Result<(), TypeGraphError> {
    for definition in type_definitions(document) {
        let name = definition.name.node.as_str();
        let definition_id = graph.require_definition(name, "extend")?.id();

        match &definition.kind {
            ast::TypeKind::Object(ast::ObjectType { implements, fields, .. })
            | ast::TypeKind::Interface(ast::InterfaceType { implements, fields, .. }) => {
                for interface in implements {
                    let interface_id = graph.require_definition(&interface.node, name)?.id();
                    graph[definition_id].implements.push(interface_id);
                }

                for field in fields {
                    ingest_field(graph, definition_id, &field.node)?;
                }
            }
            ast::TypeKind::Union(union) => {
                for member in &union.members {
                    let member_id = graph.require_definition(&member.node, name)?.id();
                    graph[definition_id].possible_types.push(member_id);
                }
            }
            ast::TypeKind::Enum(enum_type) => {
                let values = enum_type.values.iter().map(|value| value.node.value.node.to_string());
                graph[definition_id].enum_values.extend(values);
            }
            ast::TypeKind::InputObject(input_object) => {
                for field in &input_object.fields {
                    let referenced_by = format!("{name}.{}", field.node.name.node);
                    let input_value = ingest_input_value(graph, &field.node, &referenced_by)?;

                    graph.push_field(Field {
                        parent: definition_id,
                        name: input_value.name,
                        description: input_value.description,
                        ty: input_value.ty,
                        arguments: Vec::new(),
                        default_value: input_value.default_value,
                    });
                }
            }
            ast::TypeKind::Scalar => (),
        }
    }

    Ok(())
}

fn ingest_field(
    graph: &mut TypeGraph,
    parent: DefinitionId,
    field: &ast::FieldDefinition,
) -> Result<FieldId, TypeGraphError> {
    let referenced_by = format!("{}.{}", graph[parent].name, field.name.node);
    let ty = ingest_type(graph, &field.ty.node, &referenced_by)?;

    let arguments = field
        .arguments
        .iter()
        .map(|argument| {
            let referenced_by = format!("{referenced_by}({}:)", argument.node.name.node);
            ingest_input_value(graph, &argument.node, &referenced_by)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(graph.push_field(Field {
        parent,
        name: field.name.node.to_string(),
        description: field.description.as_ref().map(|description| description.node.clone()),
        ty,
        arguments,
        default_value: default_value_of(field),
    }))
}

fn ingest_input_value(
    graph: &TypeGraph,
    input_value: &ast::InputValueDefinition,
    referenced_by: &str,
) -> Result<InputValue, TypeGraphError> {
    Ok(InputValue {
        name: input_value.name.node.to_string(),
        description: input_value.description.as_ref().map(|description| description.node.clone()),
        ty: ingest_type(graph, &input_value.ty.node, referenced_by)?,
        default_value: input_value.default_value.as_ref().map(|value| value.node.clone()),
    })
}

fn ingest_type(graph: &TypeGraph, ty: &ast::Type, referenced_by: &str) -> Result<TypeRef, TypeGraphError> {
    let base = match &ty.base {
        ast::BaseType::Named(name) => TypeRef::Named(graph.require_definition(name, referenced_by)?.id()),
        ast::BaseType::List(inner) => TypeRef::List(Box::new(ingest_type(graph, inner, referenced_by)?)),
    };

    Ok(if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    })
}

fn default_value_of(field: &ast::FieldDefinition) -> Option<ConstValue> {
    field
        .directives
        .iter()
        .find(|directive| directive.node.name.node == DEFAULT_DIRECTIVE)
        .and_then(|directive| directive.node.get_argument(VALUE_ARGUMENT))
        .map(|value| value.node.clone())
}

impl TypeGraph {
    fn push_definition(&mut self, name: &str, description: Option<String>, kind: DefinitionKind, builtin: bool) {
        let id = DefinitionId::from(self.definitions.len());

        self.definitions.push(Definition {
            name: name.to_string(),
            description,
            kind,
            builtin,
            fields: Vec::new(),
            implements: Vec::new(),
            possible_types: Vec::new(),
            enum_values: Vec::new(),
        });

        self.definition_names.insert(name.to_string(), id);
    }

    fn push_field(&mut self, field: Field) -> FieldId {
        let id = FieldId::from(self.fields.len());
        let parent = field.parent;

        self.fields.push(field);
        self[parent].fields.push(id);

        id
    }

    /// Interfaces learn their implementers once every object body is known, so the order of
    /// possible types follows the declaration order of the objects.
    fn collect_possible_types(&mut self) {
        let implementations = self
            .definitions
            .iter()
            .enumerate()
            .filter(|(_, definition)| definition.kind == DefinitionKind::Object)
            .flat_map(|(idx, definition)| {
                let object_id = DefinitionId::from(idx);
                definition
                    .implements
                    .iter()
                    .map(move |interface_id| (*interface_id, object_id))
            })
            .collect::<Vec<_>>();

        for (interface_id, object_id) in implementations {
            self[interface_id].possible_types.push(object_id);
        }
    }
}
