//! Schema assembly. A [`SchemaBuilder`] owns every piece of mutable build state and is consumed
//! into an immutable [`Registry`].

mod input_shapes;
mod root_fields;

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use indexmap::{map::Entry, IndexMap};
use type_graph::{DefinitionId, DefinitionKind, SchemaSource, TypeGraph};

pub use self::input_shapes::RelationInput;
use crate::{
    config::CrudConfig,
    error::BuildError,
    registry::{InputField, InputShape, InputShapeId, OperationKind, Registry, RootField, TypeResolver},
};

pub struct SchemaBuilder {
    graph: Arc<TypeGraph>,
    config: CrudConfig,
    shapes: Vec<InputShape>,
    shape_names: HashMap<String, InputShapeId>,
    /// Forward-declared shapes whose body is not filled in yet.
    pending: VecDeque<(InputShapeId, DefinitionId)>,
    create_arguments: HashMap<String, IndexMap<String, InputField>>,
    query_fields: IndexMap<String, RootField>,
    mutation_fields: IndexMap<String, RootField>,
}

impl Registry {
    pub fn build(graph: Arc<TypeGraph>, config: CrudConfig) -> Result<Self, BuildError> {
        SchemaBuilder::new(graph, config).build()
    }

    pub fn from_source(source: &dyn SchemaSource, config: CrudConfig) -> Result<Self, BuildError> {
        Self::build(Arc::new(source.load()?), config)
    }
}

impl SchemaBuilder {
    pub fn new(graph: Arc<TypeGraph>, config: CrudConfig) -> Self {
        Self {
            graph,
            config,
            shapes: Vec::new(),
            shape_names: HashMap::new(),
            pending: VecDeque::new(),
            create_arguments: HashMap::new(),
            query_fields: IndexMap::new(),
            mutation_fields: IndexMap::new(),
        }
    }

    pub fn build(mut self) -> Result<Registry, BuildError> {
        let graph = Arc::clone(&self.graph);

        let node_types = match graph.node_types(&self.config.naming.node_interface) {
            Some(node_types) => node_types,
            None => {
                tracing::warn!(
                    interface = self.config.naming.node_interface.as_str(),
                    "the node interface is not declared, no CRUD fields will be generated"
                );
                Vec::new()
            }
        };

        for definition in node_types {
            self.generate_root_fields(definition)?;
        }

        self.complete_pending_shapes()?;
        self.check_root_types()?;

        let type_resolvers = graph
            .definitions()
            .filter(|definition| match definition.kind() {
                DefinitionKind::Interface | DefinitionKind::Union => true,
                DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject | DefinitionKind::Object => {
                    false
                }
            })
            .map(|definition| (definition.name().to_string(), TypeResolver::Typename))
            .collect::<IndexMap<_, _>>();

        tracing::info!(
            input_shapes = self.shapes.len(),
            query_fields = self.query_fields.len(),
            mutation_fields = self.mutation_fields.len(),
            type_resolvers = type_resolvers.len(),
            "assembled CRUD schema"
        );

        Ok(Registry::new(
            self.graph,
            self.config,
            self.shapes,
            self.query_fields,
            self.mutation_fields,
            type_resolvers,
        ))
    }

    /// Fills in every forward-declared shape. Filling a shape can declare new ones, which are
    /// queued in turn; the queue runs dry since every type gets at most one shape.
    fn complete_pending_shapes(&mut self) -> Result<(), BuildError> {
        let graph = Arc::clone(&self.graph);

        while let Some((shape_id, definition_id)) = self.pending.pop_front() {
            self.fill_shape(shape_id, graph.walk(definition_id))?;
        }

        Ok(())
    }

    /// A generated root type must not shadow a type of the source schema.
    fn check_root_types(&self) -> Result<(), BuildError> {
        for (kind, fields) in [
            (OperationKind::Query, &self.query_fields),
            (OperationKind::Mutation, &self.mutation_fields),
        ] {
            let type_name = match kind {
                OperationKind::Query => &self.config.naming.query_type,
                OperationKind::Mutation => &self.config.naming.mutation_type,
            };

            if !fields.is_empty() && self.graph.definition_by_name(type_name).is_some() {
                return Err(BuildError::NamingCollision {
                    name: type_name.clone(),
                });
            }
        }

        Ok(())
    }
}

fn insert_unique(
    fields: &mut IndexMap<String, InputField>,
    owner: &str,
    field: InputField,
) -> Result<(), BuildError> {
    match fields.entry(field.name.clone()) {
        Entry::Occupied(_) => Err(BuildError::NamingCollision {
            name: format!("{owner}.{}", field.name),
        }),
        Entry::Vacant(entry) => {
            entry.insert(field);
            Ok(())
        }
    }
}
