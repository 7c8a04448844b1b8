//! Runs operations against the generated root fields. Only root fields are resolved: the value a
//! resolver returns is the value of the field, without projection onto its selection set.

use std::sync::Arc;

use async_graphql_parser::{
    types::{DocumentOperations, Field, OperationDefinition, OperationType, Selection},
    Positioned,
};
use async_graphql_value::{ConstValue, Name};
use futures_util::future;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::ResolverError,
    names::{MetaNames, TYPENAME_FIELD},
    registry::{InputTypeRef, OperationKind, Registry, RootField},
    resolvers::ResolverContext,
    storage::Storage,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl Response {
    fn request_error(message: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            errors: vec![ResponseError {
                message: message.into(),
                path: Vec::new(),
            }],
        }
    }
}

pub struct Engine {
    registry: Arc<Registry>,
    storage: Arc<dyn Storage>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, storage: Arc<dyn Storage>) -> Self {
        Self { registry, storage }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn execute(&self, request: Request) -> Response {
        let document = match async_graphql_parser::parse_query(&request.query) {
            Ok(document) => document,
            Err(error) => return Response::request_error(error.to_string()),
        };

        let operation = match select_operation(document.operations, request.operation_name.as_deref()) {
            Ok(operation) => operation.node,
            Err(message) => return Response::request_error(message),
        };

        let kind = match operation.ty {
            OperationType::Query => OperationKind::Query,
            OperationType::Mutation => OperationKind::Mutation,
            OperationType::Subscription => return Response::request_error("Subscriptions are not supported."),
        };

        let variables = match effective_variables(&operation, request.variables) {
            Ok(variables) => variables,
            Err(error) => return Response::request_error(error.to_string()),
        };

        let fields = operation
            .selection_set
            .node
            .items
            .iter()
            .filter_map(|selection| match &selection.node {
                Selection::Field(field) => Some(&field.node),
                Selection::FragmentSpread(_) | Selection::InlineFragment(_) => None,
            })
            .collect::<Vec<_>>();

        tracing::debug!(operation = ?kind, fields = fields.len(), "executing operation");

        let results = match kind {
            OperationKind::Query => {
                future::join_all(
                    fields
                        .iter()
                        .map(|field| self.resolve_root_field(kind, field, &variables)),
                )
                .await
            }
            OperationKind::Mutation => {
                let mut results = Vec::with_capacity(fields.len());
                for field in &fields {
                    results.push(self.resolve_root_field(kind, field, &variables).await);
                }
                results
            }
        };

        let mut data = Map::new();
        let mut errors = Vec::new();

        for (field, result) in fields.iter().zip(results) {
            let response_key = field.response_key().node.to_string();

            match result {
                Ok(value) => {
                    data.insert(response_key, value);
                }
                Err(error) => {
                    tracing::debug!(field = response_key.as_str(), %error, "root field failed");

                    errors.push(ResponseError {
                        message: error.to_string(),
                        path: vec![response_key.clone()],
                    });
                    data.insert(response_key, Value::Null);
                }
            }
        }

        Response {
            data: Value::Object(data),
            errors,
        }
    }

    async fn resolve_root_field(
        &self,
        kind: OperationKind,
        field: &Field,
        variables: &Map<String, Value>,
    ) -> Result<Value, ResolverError> {
        let name = field.name.node.as_str();

        if name == TYPENAME_FIELD {
            return Ok(Value::String(self.registry.root_type_name(kind).to_string()));
        }

        let root_field = self
            .registry
            .root_field(kind, name)
            .ok_or_else(|| ResolverError::UnknownField {
                name: name.to_string(),
                type_name: self.registry.root_type_name(kind).to_string(),
            })?;

        let args = coerce_arguments(&self.registry, root_field, field, variables)?;

        let ctx = ResolverContext {
            registry: &self.registry,
            storage: self.storage.as_ref(),
            field,
        };

        root_field.resolver.resolve(ctx, args).await
    }
}

fn select_operation(
    operations: DocumentOperations,
    operation_name: Option<&str>,
) -> Result<Positioned<OperationDefinition>, String> {
    match (operations, operation_name) {
        (DocumentOperations::Single(operation), _) => Ok(operation),
        (DocumentOperations::Multiple(operations), Some(operation_name)) => operations
            .into_iter()
            .find(|(name, _)| name.as_str() == operation_name)
            .map(|(_, operation)| operation)
            .ok_or_else(|| format!("Unknown operation named `{operation_name}`.")),
        (DocumentOperations::Multiple(_), None) => {
            Err("The document contains several operations, an operation name is required.".to_string())
        }
    }
}

/// The request variables, completed with the defaults declared by the operation.
fn effective_variables(
    operation: &OperationDefinition,
    mut variables: Map<String, Value>,
) -> Result<Map<String, Value>, ResolverError> {
    for definition in &operation.variable_definitions {
        let name = definition.node.name.node.as_str();

        if variables.contains_key(name) {
            continue;
        }

        if let Some(default_value) = &definition.node.default_value {
            variables.insert(name.to_string(), to_json(name, default_value.node.clone())?);
        }
    }

    Ok(variables)
}

fn coerce_arguments(
    registry: &Registry,
    root_field: &RootField,
    field: &Field,
    variables: &Map<String, Value>,
) -> Result<Map<String, Value>, ResolverError> {
    let mut args = Map::new();

    for (name, value) in &field.arguments {
        let name = name.node.as_str();

        let Some(definition) = root_field.arguments.get(name) else {
            return Err(ResolverError::InvalidArgument {
                name: name.to_string(),
                message: format!("`{}` has no such argument", root_field.name),
            });
        };

        let value = value
            .node
            .clone()
            .into_const_with(|variable| variable_value(variables, &variable))?;

        let mut value = to_json(name, value)?;
        coerce_input_value(registry, &definition.ty, &mut value)?;

        args.insert(name.to_string(), value);
    }

    for (name, definition) in &root_field.arguments {
        if args.contains_key(name) {
            continue;
        }

        match &definition.default_value {
            Some(default_value) => {
                args.insert(name.clone(), to_json(name, default_value.clone())?);
            }
            None if definition.ty.is_required() => {
                return Err(ResolverError::InvalidArgument {
                    name: name.clone(),
                    message: "a value is required".to_string(),
                });
            }
            None => (),
        }
    }

    Ok(args)
}

/// Checks input objects against their generated shape and fills in the declared defaults of
/// fields left out. A single value given for a list is checked as an item of that list.
fn coerce_input_value(registry: &Registry, ty: &InputTypeRef, value: &mut Value) -> Result<(), ResolverError> {
    match (ty, value) {
        (InputTypeRef::NonNull(inner), value) => coerce_input_value(registry, inner, value),
        (InputTypeRef::List(inner), Value::Array(items)) => items
            .iter_mut()
            .try_for_each(|item| coerce_input_value(registry, inner, item)),
        (InputTypeRef::List(inner), value) => coerce_input_value(registry, inner, value),
        (InputTypeRef::Shape(id), Value::Object(object)) => {
            let shape = &registry[*id];

            if let Some(unknown) = object
                .keys()
                .find(|key| !shape.fields.contains_key(key.as_str()) && !MetaNames::is_typename_key(key))
            {
                return Err(ResolverError::UnknownField {
                    name: unknown.clone(),
                    type_name: shape.name.clone(),
                });
            }

            for field in shape.fields.values() {
                match object.get_mut(&field.name) {
                    Some(value) => coerce_input_value(registry, &field.ty, value)?,
                    None => {
                        if let Some(default_value) = &field.default_value {
                            object.insert(field.name.clone(), to_json(&field.name, default_value.clone())?);
                        }
                    }
                }
            }

            Ok(())
        }
        _ => Ok(()),
    }
}

fn variable_value(variables: &Map<String, Value>, name: &Name) -> Result<ConstValue, ResolverError> {
    match variables.get(name.as_str()) {
        Some(value) => ConstValue::from_json(value.clone()).map_err(|error| ResolverError::InvalidArgument {
            name: format!("${name}"),
            message: error.to_string(),
        }),
        None => Ok(ConstValue::Null),
    }
}

fn to_json(name: &str, value: ConstValue) -> Result<Value, ResolverError> {
    value.into_json().map_err(|error| ResolverError::InvalidArgument {
        name: name.to_string(),
        message: error.to_string(),
    })
}
