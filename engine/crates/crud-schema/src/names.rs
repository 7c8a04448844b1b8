use inflector::Inflector;
use type_graph::DefinitionKind;

pub const INPUT_SUFFIX: &str = "Input";
pub const ID_SUFFIX: &str = "Id";
pub const IDS_SUFFIX: &str = "Ids";

pub const IDENTIFIER_TYPE: &str = "ID";
pub const INPUT_ARG_ID: &str = "id";

/// Discriminators a client may send along an input value. They never carry data.
pub const TYPENAME_KEYS: [&str; 2] = ["__typename", "_typename"];
pub const TYPENAME_FIELD: &str = "__typename";

pub struct MetaNames;

/// CONVENTIONS:
///     - Input shapes are the type name suffixed by "Input"
///     - Root fields keep the type name as is: `all<Plural>`, `<Type>`, `create<Type>`
///     - A relation `field` is shadowed by `fieldId`, or `fieldIds` when it is a list
impl MetaNames {
    pub fn input_shape(type_name: &str) -> String {
        format!("{type_name}{INPUT_SUFFIX}")
    }

    pub fn query_all(type_name: &str) -> String {
        format!("all{}", type_name.to_plural())
    }

    pub fn query_single(type_name: &str) -> String {
        type_name.to_string()
    }

    pub fn mutation_create(type_name: &str) -> String {
        format!("create{type_name}")
    }

    pub fn shadow_identifier(field_name: &str, is_list: bool) -> String {
        if is_list {
            format!("{field_name}{IDS_SUFFIX}")
        } else {
            format!("{field_name}{ID_SUFFIX}")
        }
    }

    /// Key of a member of a polymorphic relation inside its wrapper shape. Union members are
    /// keyed by their input shape name, interface implementations by their type name.
    pub fn polymorphic_member(abstract_kind: DefinitionKind, member_name: &str) -> String {
        match abstract_kind {
            DefinitionKind::Union => Self::input_shape(member_name),
            DefinitionKind::Interface
            | DefinitionKind::Object
            | DefinitionKind::Scalar
            | DefinitionKind::Enum
            | DefinitionKind::InputObject => member_name.to_string(),
        }
    }

    pub fn is_typename_key(key: &str) -> bool {
        TYPENAME_KEYS.contains(&key)
    }
}

/// An argument key referencing existing records by identifier instead of carrying new data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowKey<'a> {
    /// `authorId`: the `author` relation.
    Single(&'a str),
    /// `tagIds`: the `tags` relation.
    List(&'a str),
}

impl<'a> ShadowKey<'a> {
    pub fn parse(key: &'a str) -> Option<Self> {
        if let Some(field_name) = key.strip_suffix(IDS_SUFFIX).filter(|name| !name.is_empty()) {
            return Some(ShadowKey::List(field_name));
        }

        key.strip_suffix(ID_SUFFIX)
            .filter(|name| !name.is_empty())
            .map(ShadowKey::Single)
    }

    pub fn field_name(self) -> &'a str {
        match self {
            ShadowKey::Single(name) | ShadowKey::List(name) => name,
        }
    }
}
