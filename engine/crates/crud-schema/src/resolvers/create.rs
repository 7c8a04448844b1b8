//! Creation of a record together with the records of its nested inputs.
//!
//! A nested input is created before its parent, and the parent is then sent the identifier of
//! the new record under the relation field. Sibling nested inputs do not depend on each other
//! and are created concurrently. Records created before a failure are not rolled back.

use futures_util::future::{self, BoxFuture};
use serde_json::{Map, Value};
use tracing::Instrument;
use type_graph::{DefinitionKind, DefinitionWalker};

use crate::{
    error::ResolverError,
    names::{MetaNames, ShadowKey},
    registry::Registry,
    storage::{Storage, StorageError},
};

#[derive(Clone, Copy)]
pub(super) struct NestedCreate<'a> {
    registry: &'a Registry,
    storage: &'a dyn Storage,
}

/// A record created for a nested input, to be linked from its parent.
struct Created {
    field_name: String,
    id: Value,
}

/// The single member set in the input of a polymorphic relation.
enum Member<'a> {
    New(DefinitionWalker<'a>, Map<String, Value>),
    Existing(Value),
}

impl<'a> NestedCreate<'a> {
    pub(super) fn new(registry: &'a Registry, storage: &'a dyn Storage) -> Self {
        Self { registry, storage }
    }

    /// Creates a `type_name` record from `args` and returns it as the storage returned it.
    pub(super) async fn create(self, type_name: &str, args: Map<String, Value>) -> Result<Value, ResolverError> {
        let definition = self
            .registry
            .graph()
            .definition_by_name(type_name)
            .ok_or_else(|| StorageError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        self.resolve_one(definition, args).await
    }

    fn resolve_one(
        self,
        definition: DefinitionWalker<'a>,
        mut args: Map<String, Value>,
    ) -> BoxFuture<'a, Result<Value, ResolverError>> {
        let span = tracing::debug_span!("create", type_name = definition.name());

        Box::pin(
            async move {
                let (literal_keys, shadow_keys) = partition(definition, &args);

                if literal_keys.is_empty() {
                    return Err(ResolverError::EmptyMutation {
                        type_name: definition.name().to_string(),
                    });
                }

                let mut nested = Vec::new();
                let mut cleared = Vec::new();

                for key in &literal_keys {
                    let Some(field) = definition.field_by_name(key) else {
                        continue;
                    };
                    let Some(linked) = field.linked_type() else {
                        continue;
                    };

                    match args.get_mut(key) {
                        // a single input given for a list relation still links as a list
                        Some(slot) if slot.is_object() => {
                            if let Value::Object(value) = std::mem::take(slot) {
                                nested.push(self.resolve_nested(key, linked, value));
                            }

                            if field.ty().is_list() {
                                *slot = Value::Array(Vec::new());
                            } else {
                                cleared.push(key);
                            }
                        }
                        Some(Value::Array(items)) => {
                            let (objects, others): (Vec<_>, Vec<_>) =
                                std::mem::take(items).into_iter().partition(Value::is_object);
                            *items = others;

                            for value in objects {
                                if let Value::Object(value) = value {
                                    nested.push(self.resolve_nested(key, linked, value));
                                }
                            }
                        }
                        _ => (),
                    }
                }

                for key in cleared {
                    args.shift_remove(key);
                }

                if !nested.is_empty() {
                    tracing::debug!(nested = nested.len(), "creating nested records first");
                }

                for Created { field_name, id } in future::try_join_all(nested).await? {
                    match args.get_mut(&field_name) {
                        Some(Value::Array(ids)) => match id {
                            Value::Array(more) => ids.extend(more),
                            id => ids.push(id),
                        },
                        _ => {
                            args.insert(field_name, id);
                        }
                    }
                }

                for key in shadow_keys {
                    merge_identifiers(&mut args, &key)?;
                }

                args.retain(|key, _| !MetaNames::is_typename_key(key));

                let record = self.storage.create(definition.name(), args).await?;
                tracing::debug!("created record");

                Ok(record)
            }
            .instrument(span),
        )
    }

    fn resolve_nested(
        self,
        field_name: &str,
        linked: DefinitionWalker<'a>,
        value: Map<String, Value>,
    ) -> BoxFuture<'a, Result<Created, ResolverError>> {
        let field_name = field_name.to_string();

        Box::pin(async move {
            let record = match linked.kind() {
                DefinitionKind::Interface | DefinitionKind::Union => {
                    match polymorphic_member(&field_name, linked, value)? {
                        Member::Existing(id) => return Ok(Created { field_name, id }),
                        Member::New(member, value) => self.resolve_one(member, value).await?,
                    }
                }
                DefinitionKind::Object | DefinitionKind::Scalar | DefinitionKind::Enum | DefinitionKind::InputObject => {
                    self.resolve_one(linked, value).await?
                }
            };

            let id = self.extract_id(&record);

            Ok(Created { field_name, id })
        })
    }

    fn extract_id(self, record: &Value) -> Value {
        match record {
            Value::Array(records) => Value::Array(records.iter().map(|record| self.extract_id(record)).collect()),
            record => record
                .get(&self.registry.config().naming.id_field)
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

/// Splits the keys of `args` into literal fields and shadow identifiers. A key that is a
/// declared field of the type is always literal, even if it ends in `Id`.
fn partition(definition: DefinitionWalker<'_>, args: &Map<String, Value>) -> (Vec<String>, Vec<String>) {
    let mut literal_keys = Vec::new();
    let mut shadow_keys = Vec::new();

    for key in args.keys() {
        if MetaNames::is_typename_key(key) {
            continue;
        }

        if definition.field_by_name(key).is_none() && ShadowKey::parse(key).is_some() {
            shadow_keys.push(key.clone());
        } else {
            literal_keys.push(key.clone());
        }
    }

    (literal_keys, shadow_keys)
}

/// Moves a caller-supplied `xId` or `xIds` under `x`. Listed identifiers come before the ones of
/// records created from nested inputs.
fn merge_identifiers(args: &mut Map<String, Value>, key: &str) -> Result<(), ResolverError> {
    let Some(shadow) = ShadowKey::parse(key) else {
        return Ok(());
    };

    let Some(value) = args.shift_remove(key) else {
        return Ok(());
    };

    let field_name = shadow.field_name().to_string();

    match shadow {
        ShadowKey::List(_) => {
            let mut ids = match value {
                Value::Array(ids) => ids,
                Value::Null => Vec::new(),
                id => vec![id],
            };

            match args.get_mut(&field_name) {
                Some(Value::Array(existing)) => {
                    ids.append(existing);
                    *existing = ids;
                }
                Some(Value::Null) | None => {
                    args.insert(field_name, Value::Array(ids));
                }
                Some(existing) => {
                    ids.push(std::mem::take(existing));
                    *existing = Value::Array(ids);
                }
            }
        }
        ShadowKey::Single(_) => {
            if value.is_null() {
                return Ok(());
            }

            if args.get(&field_name).is_some_and(|existing| !existing.is_null()) {
                return Err(ResolverError::ConflictingRelationArgument {
                    field: field_name,
                    key: key.to_string(),
                });
            }

            args.insert(field_name, value);
        }
    }

    Ok(())
}

fn polymorphic_member<'a>(
    field_name: &str,
    linked: DefinitionWalker<'a>,
    value: Map<String, Value>,
) -> Result<Member<'a>, ResolverError> {
    let mut provided = value.into_iter().filter(|(_, value)| !value.is_null());

    let (Some((key, value)), None) = (provided.next(), provided.next()) else {
        return Err(ResolverError::AmbiguousPolymorphicInput {
            field: field_name.to_string(),
            type_name: linked.name().to_string(),
        });
    };

    for member in linked.possible_types() {
        let member_key = MetaNames::polymorphic_member(linked.kind(), member.name());

        if key == member_key {
            return match value {
                Value::Object(value) => Ok(Member::New(member, value)),
                _ => Err(ResolverError::InvalidArgument {
                    name: format!("{field_name}.{key}"),
                    message: "expected an input object".to_string(),
                }),
            };
        }

        if key == MetaNames::shadow_identifier(&member_key, false) {
            return Ok(Member::Existing(value));
        }
    }

    Err(ResolverError::InvalidArgument {
        name: format!("{field_name}.{key}"),
        message: format!("not a member of `{}`", linked.name()),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn caller_identifiers_come_first() {
        let mut args = map(json!({ "tags": ["t1"], "tagsIds": ["t2", "t3"] }));

        merge_identifiers(&mut args, "tagsIds").unwrap();

        assert_eq!(Value::Object(args), json!({ "tags": ["t2", "t3", "t1"] }));
    }

    #[test]
    fn single_identifier_fills_an_empty_relation() {
        let mut args = map(json!({ "title": "Hello", "authorId": "1" }));

        merge_identifiers(&mut args, "authorId").unwrap();

        assert_eq!(Value::Object(args), json!({ "title": "Hello", "author": "1" }));
    }

    #[test]
    fn single_identifier_conflicts_with_a_set_relation() {
        let mut args = map(json!({ "author": "2", "authorId": "1" }));

        let error = merge_identifiers(&mut args, "authorId").unwrap_err();

        assert!(
            matches!(
                &error,
                ResolverError::ConflictingRelationArgument { field, key } if field == "author" && key == "authorId"
            ),
            "{error}"
        );
    }

    #[test]
    fn null_identifiers_are_dropped() {
        let mut args = map(json!({ "title": "Hello", "authorId": null, "tagsIds": null }));

        merge_identifiers(&mut args, "authorId").unwrap();
        merge_identifiers(&mut args, "tagsIds").unwrap();

        assert_eq!(Value::Object(args), json!({ "title": "Hello", "tags": [] }));
    }
}
