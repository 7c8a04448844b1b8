use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use type_graph::{DefinitionKind, RelationLinks, TypeGraph};

use super::{IncludePath, Storage, StorageError};
use crate::names::TYPENAME_FIELD;

/// Process-local tables, one per object type. Identifiers are assigned sequentially across all
/// tables, starting at `"1"`. Every call is journaled.
pub struct MemoryStorage {
    graph: Arc<TypeGraph>,
    id_field: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    tables: IndexMap<String, Vec<Map<String, Value>>>,
    last_id: u64,
    journal: Vec<StorageCall>,
}

/// A call received by [`MemoryStorage`], with the arguments it was called with.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    Create {
        type_name: String,
        args: Map<String, Value>,
    },
    Find {
        type_name: String,
        ids: Option<Vec<Value>>,
        includes: Vec<IncludePath>,
    },
}

impl MemoryStorage {
    pub fn new(graph: Arc<TypeGraph>, id_field: impl Into<String>) -> Self {
        Self {
            graph,
            id_field: id_field.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn journal(&self) -> Vec<StorageCall> {
        self.state().map(|state| state.journal.clone()).unwrap_or_default()
    }

    /// The types of the records created so far, in creation order.
    pub fn created_types(&self) -> Vec<String> {
        self.journal()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Create { type_name, .. } => Some(type_name),
                StorageCall::Find { .. } => None,
            })
            .collect()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Other(anyhow::anyhow!("the in-memory storage lock is poisoned")))
    }

    fn require_object_type(&self, type_name: &str) -> Result<(), StorageError> {
        match self.graph.definition_by_name(type_name).map(|definition| definition.kind()) {
            Some(DefinitionKind::Object) => Ok(()),
            Some(
                DefinitionKind::Scalar
                | DefinitionKind::Enum
                | DefinitionKind::InputObject
                | DefinitionKind::Interface
                | DefinitionKind::Union,
            )
            | None => Err(StorageError::UnknownType {
                type_name: type_name.to_string(),
            }),
        }
    }

    /// Tables that can hold a record of `type_name`: its own for objects, the ones of its
    /// possible types for interfaces and unions.
    fn candidate_tables(&self, type_name: &str) -> Vec<&str> {
        let Some(definition) = self.graph.definition_by_name(type_name) else {
            return Vec::new();
        };

        match definition.kind() {
            DefinitionKind::Interface | DefinitionKind::Union => {
                definition.possible_types().map(|member| member.name()).collect()
            }
            DefinitionKind::Object | DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject => {
                vec![definition.name()]
            }
        }
    }

    fn lookup(&self, state: &State, type_name: &str, id: &Value) -> Option<Map<String, Value>> {
        self.candidate_tables(type_name)
            .into_iter()
            .filter_map(|table| state.tables.get(table))
            .flatten()
            .find(|record| record.get(&self.id_field) == Some(id))
            .cloned()
    }

    fn include(&self, state: &State, type_name: &str, record: &mut Map<String, Value>, segments: &[String]) {
        let Some((field_name, rest)) = segments.split_first() else {
            return;
        };

        let Some(linked) = self.graph.relation_link(type_name, field_name) else {
            return;
        };

        let Some(slot) = record.get_mut(field_name) else {
            return;
        };

        *slot = match std::mem::take(slot) {
            Value::Array(items) => Value::Array(items.into_iter().map(|item| self.load(state, linked, item)).collect()),
            item => self.load(state, linked, item),
        };

        match slot {
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(related) = item {
                        self.include(state, linked, related, rest);
                    }
                }
            }
            Value::Object(related) => self.include(state, linked, related, rest),
            _ => (),
        }
    }

    /// Replaces an identifier by the record it refers to. Records already loaded by a shorter
    /// include path are kept.
    fn load(&self, state: &State, type_name: &str, item: Value) -> Value {
        match item {
            Value::Object(_) | Value::Null => item,
            id => self.lookup(state, type_name, &id).map(Value::Object).unwrap_or(Value::Null),
        }
    }
}

fn matches_filter(record: &Map<String, Value>, filter: Option<&Value>) -> bool {
    match filter {
        Some(Value::Object(filter)) => filter.iter().all(|(key, value)| record.get(key) == Some(value)),
        _ => true,
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn create(&self, type_name: &str, args: Map<String, Value>) -> Result<Value, StorageError> {
        self.require_object_type(type_name)?;

        let mut state = self.state()?;
        state.journal.push(StorageCall::Create {
            type_name: type_name.to_string(),
            args: args.clone(),
        });

        state.last_id += 1;

        let mut record = Map::new();
        record.insert(TYPENAME_FIELD.to_string(), Value::String(type_name.to_string()));
        record.insert(self.id_field.clone(), Value::String(state.last_id.to_string()));
        record.extend(
            args.into_iter()
                .filter(|(key, _)| key != TYPENAME_FIELD && *key != self.id_field),
        );

        tracing::debug!(type_name, id = state.last_id, "stored record");

        state
            .tables
            .entry(type_name.to_string())
            .or_default()
            .push(record.clone());

        Ok(Value::Object(record))
    }

    async fn find(
        &self,
        type_name: &str,
        ids: Option<&[Value]>,
        filter: Option<&Value>,
        includes: &[IncludePath],
    ) -> Result<Value, StorageError> {
        self.require_object_type(type_name)?;

        let mut state = self.state()?;
        state.journal.push(StorageCall::Find {
            type_name: type_name.to_string(),
            ids: ids.map(<[Value]>::to_vec),
            includes: includes.to_vec(),
        });

        let state = &*state;

        let mut records = match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.lookup(state, type_name, id))
                .collect::<Vec<_>>(),
            None => state.tables.get(type_name).cloned().unwrap_or_default(),
        };

        records.retain(|record| matches_filter(record, filter));

        for record in &mut records {
            for path in includes {
                self.include(state, type_name, record, path.segments());
            }
        }

        Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
    }
}

impl RelationLinks for MemoryStorage {
    fn relation_link(&self, type_name: &str, field_name: &str) -> Option<&str> {
        self.graph.relation_link(type_name, field_name)
    }
}
