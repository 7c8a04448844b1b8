use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Which entry points to generate, and the names the generated schema is built around.
pub struct CrudConfig {
    /// Switches for the generated root fields
    pub generate: GenerateConfig,
    /// Names of the marker interface, the identifier field and the root types
    pub naming: NamingConfig,
}

impl CrudConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// `all<Plural>: [T]` query fields.
    pub get_all: bool,
    /// `<T>(id: ID!): T` query fields.
    pub get_single: bool,
    /// `create<T>(...): T` mutation fields.
    pub create: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            get_all: true,
            get_single: true,
            create: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Every object implementing this interface gets CRUD fields.
    pub node_interface: String,
    /// The identifier field of node types. Left out of input shapes.
    pub id_field: String,
    pub query_type: String,
    pub mutation_type: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            node_interface: "Node".to_string(),
            id_field: "id".to_string(),
            query_type: "Query".to_string(),
            mutation_type: "Mutation".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn defaults() {
        let config = CrudConfig::from_toml("").unwrap();

        assert!(config.generate.get_all);
        assert!(config.generate.get_single);
        assert!(config.generate.create);
        assert_eq!("Node", config.naming.node_interface);
        assert_eq!("id", config.naming.id_field);
        assert_eq!(CrudConfig::default(), config);
    }

    #[test]
    fn partial_tables_keep_the_other_defaults() {
        let input = indoc! {r#"
            [generate]
            create = false

            [naming]
            node_interface = "Entity"
        "#};

        let config = CrudConfig::from_toml(input).unwrap();

        assert!(config.generate.get_all);
        assert!(!config.generate.create);
        assert_eq!("Entity", config.naming.node_interface);
        assert_eq!("Query", config.naming.query_type);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let input = indoc! {r#"
            [generate]
            delete = true
        "#};

        let error = CrudConfig::from_toml(input).unwrap_err();

        assert!(error.to_string().contains("unknown field `delete`"), "{error}");
    }
}
