//! Input shapes mirror the object, interface and union types of the source schema. Relations may
//! form cycles, so a shape is forward-declared before its body is computed and every reference
//! to it goes through its [`InputShapeId`].

use std::sync::Arc;

use indexmap::IndexMap;
use type_graph::{DefinitionKind, DefinitionWalker, FieldWalker, TypeRef};

use super::{insert_unique, SchemaBuilder};
use crate::{
    error::BuildError,
    names::MetaNames,
    registry::{InputField, InputShape, InputShapeId, InputTypeRef},
};

/// The two ways of filling a relation: a nested input creating new records, or identifiers of
/// existing ones. Both carry the list and non-null modifiers of the relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInput {
    pub shape: InputTypeRef,
    pub identifier: InputTypeRef,
}

impl RelationInput {
    fn map(self, wrap: impl Fn(InputTypeRef) -> InputTypeRef) -> Self {
        Self {
            shape: wrap(self.shape),
            identifier: wrap(self.identifier),
        }
    }
}

impl SchemaBuilder {
    /// Derives the input counterpart of a relation type. With `stub`, a shape seen for the first
    /// time is only declared: its body is filled in later, once the current one is done.
    pub fn synthesize(&mut self, ty: &TypeRef, stub: bool) -> Result<RelationInput, BuildError> {
        match ty {
            TypeRef::List(inner) => Ok(self
                .synthesize(inner, stub)?
                .map(|ty| InputTypeRef::List(Box::new(ty)))),
            TypeRef::NonNull(inner) => Ok(self
                .synthesize(inner, stub)?
                .map(|ty| InputTypeRef::NonNull(Box::new(ty)))),
            TypeRef::Named(id) => {
                let graph = Arc::clone(&self.graph);
                let definition = graph.walk(*id);

                let shape = match definition.kind() {
                    DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject => {
                        InputTypeRef::Named(definition.name().to_string())
                    }
                    DefinitionKind::Object | DefinitionKind::Interface | DefinitionKind::Union => {
                        InputTypeRef::Shape(self.shape_of(definition, stub)?)
                    }
                };

                Ok(RelationInput {
                    shape,
                    identifier: InputTypeRef::identifier(),
                })
            }
        }
    }

    fn shape_of(&mut self, definition: DefinitionWalker<'_>, stub: bool) -> Result<InputShapeId, BuildError> {
        let name = MetaNames::input_shape(definition.name());

        if let Some(id) = self.shape_names.get(&name) {
            return Ok(*id);
        }

        if self.graph.definition_by_name(&name).is_some() {
            return Err(BuildError::NamingCollision { name });
        }

        let id = InputShapeId::from(self.shapes.len());
        self.shapes.push(InputShape {
            name: name.clone(),
            type_name: definition.name().to_string(),
            fields: IndexMap::new(),
        });
        self.shape_names.insert(name, id);

        if stub {
            self.pending.push_back((id, definition.id()));
        } else {
            self.fill_shape(id, definition)?;
        }

        Ok(id)
    }

    pub(super) fn fill_shape(&mut self, id: InputShapeId, definition: DefinitionWalker<'_>) -> Result<(), BuildError> {
        let owner = self.shapes[usize::from(id)].name.clone();
        let mut fields = IndexMap::new();

        match definition.kind() {
            DefinitionKind::Object => {
                for field in definition.fields() {
                    if field.name() == self.config.naming.id_field {
                        continue;
                    }

                    self.insert_entity_field(&mut fields, &owner, field, true)?;
                }
            }
            kind @ (DefinitionKind::Interface | DefinitionKind::Union) => {
                for member in definition.possible_types() {
                    let key = MetaNames::polymorphic_member(kind, member.name());
                    let relation = self.synthesize(&TypeRef::Named(member.id()), true)?;
                    insert_relation(&mut fields, &owner, &key, relation)?;
                }
            }
            DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject => (),
        }

        tracing::debug!(shape = owner.as_str(), fields = fields.len(), "filled input shape");

        self.shapes[usize::from(id)].fields = fields;

        Ok(())
    }

    /// Adds a field of an entity type: as is when its type can be used as an input, as a pair of
    /// nested shape and shadow identifier when it is a relation.
    pub(super) fn insert_entity_field(
        &mut self,
        fields: &mut IndexMap<String, InputField>,
        owner: &str,
        field: FieldWalker<'_>,
        stub: bool,
    ) -> Result<(), BuildError> {
        if field.named_type().kind().is_input() {
            return insert_unique(
                fields,
                owner,
                InputField {
                    name: field.name().to_string(),
                    ty: InputTypeRef::from_type_ref(field.graph(), field.ty()),
                    default_value: field.default_value().cloned(),
                },
            );
        }

        let relation = self.synthesize(field.ty(), stub)?;
        insert_relation(fields, owner, field.name(), relation)
    }
}

/// The nested shape and the identifier are alternatives, so neither can be required. Only the
/// outermost non-null is relaxed: `[Tag!]!` becomes `[TagInput!]` and `[ID!]`.
fn insert_relation(
    fields: &mut IndexMap<String, InputField>,
    owner: &str,
    field_name: &str,
    relation: RelationInput,
) -> Result<(), BuildError> {
    let shape = relation.shape.into_nullable();
    let identifier = relation.identifier.into_nullable();

    insert_unique(
        fields,
        owner,
        InputField {
            name: field_name.to_string(),
            ty: shape,
            default_value: None,
        },
    )?;

    insert_unique(
        fields,
        owner,
        InputField {
            name: MetaNames::shadow_identifier(field_name, identifier.is_list()),
            ty: identifier,
            default_value: None,
        },
    )
}
