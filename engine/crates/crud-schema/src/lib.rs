//! Generates a CRUD API from a GraphQL type schema.
//!
//! Every object implementing the node interface gets `all<Plural>` and `<Type>(id:)` query fields
//! and a `create<Type>` mutation. Create mutations accept nested inputs for relations, each
//! paired with a shadow `<field>Id`/`<field>Ids` argument referencing existing records. Reads
//! eager-load the relations selected by the client.
//!
//! Assembly runs once: [`Registry::build`] turns a [`TypeGraph`](type_graph::TypeGraph) into an
//! immutable registry, which an [`Engine`] then serves over a [`Storage`].

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod builder;
mod config;
mod engine;
mod error;
mod names;
mod registry;
mod resolvers;
mod storage;

pub use self::{
    builder::{RelationInput, SchemaBuilder},
    config::{CrudConfig, GenerateConfig, NamingConfig},
    engine::{Engine, Request, Response, ResponseError},
    error::{BuildError, ResolverError},
    names::{MetaNames, ShadowKey},
    registry::{InputField, InputShape, InputShapeId, InputTypeRef, OperationKind, Registry, RootField, TypeResolver},
    resolvers::{includes, Resolver, ResolverContext},
    storage::{IncludePath, MemoryStorage, Storage, StorageCall, StorageError},
};
pub use type_graph;
