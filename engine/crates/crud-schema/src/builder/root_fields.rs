use indexmap::{map::Entry, IndexMap};
use type_graph::{DefinitionWalker, TypeRef};

use super::SchemaBuilder;
use crate::{
    error::BuildError,
    names::{MetaNames, INPUT_ARG_ID},
    registry::{InputField, InputTypeRef, OperationKind, RootField},
    resolvers::Resolver,
};

impl SchemaBuilder {
    pub(super) fn generate_root_fields(&mut self, definition: DefinitionWalker<'_>) -> Result<(), BuildError> {
        let generate = self.config.generate;

        if generate.get_all {
            self.generate_get_all(definition)?;
        }

        if generate.get_single {
            self.generate_get_single(definition)?;
        }

        if generate.create {
            self.generate_create(definition)?;
        }

        Ok(())
    }

    /// `all<Plural>: [T]`
    pub fn generate_get_all(&mut self, definition: DefinitionWalker<'_>) -> Result<(), BuildError> {
        self.register_root_field(
            OperationKind::Query,
            RootField {
                name: MetaNames::query_all(definition.name()),
                ty: TypeRef::List(Box::new(TypeRef::Named(definition.id()))),
                arguments: IndexMap::new(),
                resolver: Resolver::FindMany {
                    type_name: definition.name().to_string(),
                },
            },
        )
    }

    /// `<T>(id: ID!): T`
    pub fn generate_get_single(&mut self, definition: DefinitionWalker<'_>) -> Result<(), BuildError> {
        let mut arguments = IndexMap::new();
        arguments.insert(
            INPUT_ARG_ID.to_string(),
            InputField {
                name: INPUT_ARG_ID.to_string(),
                ty: InputTypeRef::NonNull(Box::new(InputTypeRef::identifier())),
                default_value: None,
            },
        );

        self.register_root_field(
            OperationKind::Query,
            RootField {
                name: MetaNames::query_single(definition.name()),
                ty: TypeRef::Named(definition.id()),
                arguments,
                resolver: Resolver::FindOne {
                    type_name: definition.name().to_string(),
                },
            },
        )
    }

    /// `create<T>(...): T`, taking the fields of `T` as arguments.
    pub fn generate_create(&mut self, definition: DefinitionWalker<'_>) -> Result<(), BuildError> {
        let arguments = self.create_arguments(definition)?;

        self.register_root_field(
            OperationKind::Mutation,
            RootField {
                name: MetaNames::mutation_create(definition.name()),
                ty: TypeRef::Named(definition.id()),
                arguments,
                resolver: Resolver::Create {
                    type_name: definition.name().to_string(),
                },
            },
        )
    }

    /// The top-level arguments creating a `T`: its own fields keep their declared types, its
    /// relations get a nested shape and a shadow identifier. Computed once per type.
    pub fn create_arguments(
        &mut self,
        definition: DefinitionWalker<'_>,
    ) -> Result<IndexMap<String, InputField>, BuildError> {
        if let Some(arguments) = self.create_arguments.get(definition.name()) {
            return Ok(arguments.clone());
        }

        let owner = MetaNames::mutation_create(definition.name());
        let mut arguments = IndexMap::new();

        for field in definition.fields() {
            if field.name() == self.config.naming.id_field {
                continue;
            }

            self.insert_entity_field(&mut arguments, &owner, field, false)?;
        }

        self.create_arguments
            .insert(definition.name().to_string(), arguments.clone());

        Ok(arguments)
    }

    fn register_root_field(&mut self, kind: OperationKind, field: RootField) -> Result<(), BuildError> {
        let (root, fields) = match kind {
            OperationKind::Query => (&self.config.naming.query_type, &mut self.query_fields),
            OperationKind::Mutation => (&self.config.naming.mutation_type, &mut self.mutation_fields),
        };

        match fields.entry(field.name.clone()) {
            Entry::Occupied(_) => Err(BuildError::NamingCollision {
                name: format!("{root}.{}", field.name),
            }),
            Entry::Vacant(entry) => {
                tracing::debug!(root = root.as_str(), field = field.name.as_str(), "generated root field");
                entry.insert(field);
                Ok(())
            }
        }
    }
}
