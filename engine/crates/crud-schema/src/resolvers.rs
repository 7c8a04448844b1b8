//! The resolvers bound to generated root fields.

mod create;
pub mod includes;

use async_graphql_parser::types::Field;
use serde_json::{Map, Value};

use self::create::NestedCreate;
use crate::{error::ResolverError, names::INPUT_ARG_ID, registry::Registry, storage::Storage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// Every record of the type.
    FindMany { type_name: String },
    /// The record with the `id` argument, or null.
    FindOne { type_name: String },
    /// Creates a record, creating the records of nested inputs first.
    Create { type_name: String },
}

/// What a resolver needs besides its arguments.
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    pub registry: &'a Registry,
    pub storage: &'a dyn Storage,
    /// The root field being resolved, with its selection set.
    pub field: &'a Field,
}

impl ResolverContext<'_> {
    fn includes(&self, type_name: &str) -> Vec<crate::storage::IncludePath> {
        includes::flatten_selection_set(self.storage, &self.field.selection_set.node, type_name)
    }
}

impl Resolver {
    pub async fn resolve(&self, ctx: ResolverContext<'_>, args: Map<String, Value>) -> Result<Value, ResolverError> {
        match self {
            Resolver::FindMany { type_name } => {
                let includes = ctx.includes(type_name);
                tracing::debug!(type_name = type_name.as_str(), includes = includes.len(), "find many");

                Ok(ctx.storage.find(type_name, None, None, &includes).await?)
            }
            Resolver::FindOne { type_name } => {
                let id = args
                    .get(INPUT_ARG_ID)
                    .filter(|id| !id.is_null())
                    .cloned()
                    .ok_or_else(|| ResolverError::InvalidArgument {
                        name: INPUT_ARG_ID.to_string(),
                        message: "an identifier is required".to_string(),
                    })?;

                let includes = ctx.includes(type_name);
                tracing::debug!(type_name = type_name.as_str(), includes = includes.len(), "find one");

                let found = ctx.storage.find(type_name, Some(std::slice::from_ref(&id)), None, &includes).await?;

                Ok(first_record(found))
            }
            Resolver::Create { type_name } => {
                let created = NestedCreate::new(ctx.registry, ctx.storage).create(type_name, args).await?;

                let includes = ctx.includes(type_name);
                if includes.is_empty() {
                    return Ok(created);
                }

                let id_field = &ctx.registry.config().naming.id_field;
                let Some(id) = created.get(id_field).cloned() else {
                    return Ok(created);
                };

                let found = ctx.storage.find(type_name, Some(std::slice::from_ref(&id)), None, &includes).await?;

                Ok(match first_record(found) {
                    Value::Null => created,
                    record => record,
                })
            }
        }
    }
}

/// Storages answer reads with a list, single-record fields want the first entry.
fn first_record(found: Value) -> Value {
    match found {
        Value::Array(records) => records.into_iter().next().unwrap_or(Value::Null),
        record => record,
    }
}
