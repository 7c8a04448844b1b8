#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use crud_schema::{
    type_graph::TypeGraph, BuildError, CrudConfig, InputTypeRef, MetaNames, Registry, Resolver, TypeResolver,
};
use indoc::indoc;

const BLOG: &str = r"
    interface Node {
        id: ID!
    }

    type User implements Node {
        id: ID!
        name: String!
        posts: [Post!]
    }

    type Post implements Node {
        id: ID!
        title: String!
        author: User!
    }
";

const CATALOG: &str = r#"
    interface Node {
        id: ID!
    }

    interface Media {
        url: String
    }

    enum Status {
        DRAFT
        PUBLISHED
    }

    type Company implements Node {
        id: ID!
        name: String
        employees: [User!]!
        parent: Company
    }

    type User implements Node {
        id: ID!
        name: String @default(value: "anonymous")
        company: Company
        favorite: Attachment
    }

    type Image implements Node & Media {
        id: ID!
        url: String
    }

    type Video implements Node & Media {
        id: ID!
        url: String
        length: Int
    }

    union Attachment = Image | Video

    type Post implements Node {
        id: ID!
        title: String!
        status: Status @default(value: DRAFT)
        author: User
        attachments: [Attachment!]
        cover: Media
    }
"#;

fn build(sdl: &str) -> Registry {
    Registry::build(Arc::new(TypeGraph::from_sdl(sdl).unwrap()), CrudConfig::default()).unwrap()
}

#[test]
fn committed_sdl() {
    let registry = build(BLOG);

    insta::assert_snapshot!(registry.sdl(), @r###"
    interface Node {
    	id: ID!
    }

    type User implements Node {
    	id: ID!
    	name: String!
    	posts: [Post!]
    }

    type Post implements Node {
    	id: ID!
    	title: String!
    	author: User!
    }

    input PostInput {
    	title: String!
    	author: UserInput
    	authorId: ID
    }

    input UserInput {
    	name: String!
    	posts: [PostInput!]
    	postsIds: [ID!]
    }

    type Query {
    	allUsers: [User]
    	User(id: ID!): User
    	allPosts: [Post]
    	Post(id: ID!): Post
    }

    type Mutation {
    	createUser(name: String!, posts: [PostInput!], postsIds: [ID!]): User
    	createPost(title: String!, author: UserInput, authorId: ID): Post
    }

    schema {
    	query: Query
    	mutation: Mutation
    }
    "###);
}

#[test]
fn committed_sdl_is_a_valid_schema() {
    let registry = build(CATALOG);

    let reparsed = TypeGraph::from_sdl(registry.sdl()).unwrap();

    for shape in registry.input_shapes() {
        assert!(reparsed.definition_by_name(&shape.name).is_some(), "{}", shape.name);
    }
    assert!(reparsed.definition_by_name("Query").is_some());
    assert!(reparsed.definition_by_name("Mutation").is_some());

    let status = reparsed
        .definition_by_name("Post")
        .and_then(|post| post.field_by_name("status"))
        .and_then(|status| status.default_value().cloned());
    assert_eq!(status.map(|value| value.to_string()).as_deref(), Some("DRAFT"));
}

#[test]
fn cycles_terminate_through_shape_references() {
    let registry = build(indoc! {r"
        interface Node { id: ID! }
        type A implements Node { id: ID! name: String b: B }
        type B implements Node { id: ID! name: String a: A self: B }
    "});

    let a = registry.input_shape("AInput").unwrap();
    let b = registry.input_shape("BInput").unwrap();

    assert_eq!(a.fields.keys().collect::<Vec<_>>(), ["name", "b", "bId"]);
    assert_eq!(b.fields.keys().collect::<Vec<_>>(), ["name", "a", "aId", "self", "selfId"]);

    assert_eq!(registry.render_input_type(&a.fields["b"].ty), "BInput");
    assert_eq!(registry.render_input_type(&b.fields["a"].ty), "AInput");
    assert_eq!(registry.render_input_type(&b.fields["self"].ty), "BInput");
    assert_eq!(registry.input_shapes().len(), 2);
}

#[test]
fn every_referenced_shape_is_filled() {
    let registry = build(CATALOG);

    for shape in registry.input_shapes() {
        assert!(!shape.fields.is_empty(), "{} has no fields", shape.name);

        for field in shape.fields.values() {
            if let Some(id) = field.ty.shape() {
                assert!(!registry[id].fields.is_empty(), "{}.{}", shape.name, field.name);
            }
        }
    }
}

#[test]
fn relations_come_with_exactly_one_shadow_identifier() {
    let registry = build(CATALOG);

    let argument_sets = registry
        .input_shapes()
        .map(|shape| (shape.name.clone(), &shape.fields))
        .chain(
            registry
                .mutation_fields()
                .values()
                .map(|field| (field.name.clone(), &field.arguments)),
        );

    for (owner, fields) in argument_sets {
        for field in fields.values().filter(|field| field.ty.shape().is_some()) {
            let single = MetaNames::shadow_identifier(&field.name, false);
            let list = MetaNames::shadow_identifier(&field.name, true);

            let expected = if field.ty.is_list() { &list } else { &single };
            let unexpected = if field.ty.is_list() { &single } else { &list };

            assert!(fields.contains_key(expected), "{owner}.{expected} is missing");
            assert_eq!(fields[expected].ty.is_list(), field.ty.is_list(), "{owner}.{expected}");
            assert!(!fields.contains_key(unexpected), "{owner}.{unexpected}");
        }
    }
}

#[test]
fn relation_modifiers_are_carried_to_both_alternatives() {
    let registry = build(CATALOG);
    let company = registry.input_shape("CompanyInput").unwrap();

    assert_eq!(registry.render_input_type(&company.fields["employees"].ty), "[UserInput!]");
    assert_eq!(registry.render_input_type(&company.fields["employeesIds"].ty), "[ID!]");
    assert_eq!(registry.render_input_type(&company.fields["parent"].ty), "CompanyInput");
    assert_eq!(company.fields["parentId"].ty, InputTypeRef::identifier());
}

#[test]
fn polymorphic_relations_get_one_pair_per_member() {
    let registry = build(CATALOG);

    let attachment = registry.input_shape("AttachmentInput").unwrap();
    assert_eq!(
        attachment.fields.keys().collect::<Vec<_>>(),
        ["ImageInput", "ImageInputId", "VideoInput", "VideoInputId"]
    );
    assert_eq!(registry.render_input_type(&attachment.fields["ImageInput"].ty), "ImageInput");

    let media = registry.input_shape("MediaInput").unwrap();
    assert_eq!(
        media.fields.keys().collect::<Vec<_>>(),
        ["Image", "ImageId", "Video", "VideoId"]
    );
    assert_eq!(registry.render_input_type(&media.fields["Video"].ty), "VideoInput");

    let create_post = &registry.mutation_fields()["createPost"];
    assert_eq!(
        registry.render_input_type(&create_post.arguments["attachments"].ty),
        "[AttachmentInput!]"
    );
    assert_eq!(registry.render_input_type(&create_post.arguments["cover"].ty), "MediaInput");
}

#[test]
fn leaf_fields_keep_types_and_defaults() {
    let registry = build(CATALOG);
    let create_post = &registry.mutation_fields()["createPost"];

    assert_eq!(registry.render_input_type(&create_post.arguments["title"].ty), "String!");
    assert_eq!(registry.render_input_type(&create_post.arguments["status"].ty), "Status");
    assert_eq!(
        create_post.arguments["status"].default_value.as_ref().map(ToString::to_string),
        Some("DRAFT".to_string())
    );
    assert!(!create_post.arguments.contains_key("id"));

    let user = registry.input_shape("UserInput").unwrap();
    assert_eq!(
        user.fields["name"].default_value.as_ref().map(ToString::to_string),
        Some("\"anonymous\"".to_string())
    );
}

#[test]
fn root_fields_per_node_type() {
    let registry = build(CATALOG);

    assert_eq!(
        registry.query_fields().keys().collect::<Vec<_>>(),
        [
            "allCompanies",
            "Company",
            "allUsers",
            "User",
            "allImages",
            "Image",
            "allVideos",
            "Video",
            "allPosts",
            "Post"
        ]
    );
    assert_eq!(
        registry.mutation_fields().keys().collect::<Vec<_>>(),
        ["createCompany", "createUser", "createImage", "createVideo", "createPost"]
    );

    assert_eq!(
        registry.query_fields()["allPosts"].resolver,
        Resolver::FindMany {
            type_name: "Post".into()
        }
    );
    assert_eq!(
        registry.query_fields()["Post"].resolver,
        Resolver::FindOne {
            type_name: "Post".into()
        }
    );
    assert_eq!(
        registry.mutation_fields()["createPost"].resolver,
        Resolver::Create {
            type_name: "Post".into()
        }
    );
}

#[test]
fn abstract_types_resolve_by_typename() {
    let registry = build(CATALOG);

    assert_eq!(
        registry.type_resolvers().keys().collect::<Vec<_>>(),
        ["Node", "Media", "Attachment"]
    );
    assert_eq!(registry.type_resolvers()["Attachment"], TypeResolver::Typename);

    let video = serde_json::json!({ "__typename": "Video", "id": "1" });
    assert_eq!(registry.resolve_type("Attachment", &video), Some("Video"));
    assert_eq!(registry.resolve_type("Media", &serde_json::json!({ "id": "1" })), None);
    assert_eq!(registry.resolve_type("Post", &video), None);
}

#[test]
fn building_twice_gives_the_same_registry() {
    let graph = Arc::new(TypeGraph::from_sdl(CATALOG).unwrap());

    let first = Registry::build(Arc::clone(&graph), CrudConfig::default()).unwrap();
    let second = Registry::build(graph, CrudConfig::default()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.sdl(), second.sdl());
    assert_eq!(
        first.query_fields().keys().collect::<Vec<_>>(),
        second.query_fields().keys().collect::<Vec<_>>()
    );
    assert_eq!(
        first.input_shapes().map(|shape| &shape.name).collect::<Vec<_>>(),
        second.input_shapes().map(|shape| &shape.name).collect::<Vec<_>>()
    );
}

#[test]
fn generation_switches() {
    let graph = Arc::new(TypeGraph::from_sdl(BLOG).unwrap());
    let config = CrudConfig::from_toml(indoc! {r"
        [generate]
        get_all = false
        create = false
    "})
    .unwrap();

    let registry = Registry::build(graph, config).unwrap();

    assert_eq!(registry.query_fields().keys().collect::<Vec<_>>(), ["User", "Post"]);
    assert!(registry.mutation_fields().is_empty());
    assert_eq!(registry.input_shapes().len(), 0);
    assert!(!registry.sdl().contains("Mutation"));
}

#[test]
fn custom_naming() {
    let graph = Arc::new(TypeGraph::from_sdl("interface Entity { key: ID! } type Post implements Entity { key: ID! title: String }").unwrap());
    let config = CrudConfig::from_toml(indoc! {r#"
        [naming]
        node_interface = "Entity"
        id_field = "key"
        query_type = "RootQuery"
    "#})
    .unwrap();

    let registry = Registry::build(graph, config).unwrap();

    assert!(registry.query_fields().contains_key("allPosts"));
    assert_eq!(
        registry.mutation_fields()["createPost"].arguments.keys().collect::<Vec<_>>(),
        ["title"]
    );
    assert!(registry.sdl().contains("type RootQuery {"));
    assert!(registry.sdl().contains("\tquery: RootQuery\n"));
}

#[test]
fn missing_node_interface_generates_nothing() {
    let registry = build("type Post { id: ID! title: String }");

    assert!(registry.query_fields().is_empty());
    assert!(registry.mutation_fields().is_empty());
    assert_eq!(registry.sdl(), registry.graph().to_sdl());
}

#[test]
fn generated_root_field_names_must_be_unique() {
    let graph = Arc::new(
        TypeGraph::from_sdl(indoc! {r"
            interface Node { id: ID! }
            type Post implements Node { id: ID! title: String }
            type allPosts implements Node { id: ID! title: String }
        "})
        .unwrap(),
    );

    let error = Registry::build(graph, CrudConfig::default()).unwrap_err();

    assert_eq!(
        error,
        BuildError::NamingCollision {
            name: "Query.allPosts".into()
        }
    );
}

#[test]
fn declared_root_types_collide() {
    let graph = Arc::new(
        TypeGraph::from_sdl(indoc! {r"
            interface Node { id: ID! }
            type Post implements Node { id: ID! title: String }
            type Query { posts: [Post] }
        "})
        .unwrap(),
    );

    let error = Registry::build(graph, CrudConfig::default()).unwrap_err();

    assert_eq!(error, BuildError::NamingCollision { name: "Query".into() });
}

#[test]
fn schema_source_failures_abort_assembly() {
    let source = crud_schema::type_graph::SdlSource::Inline("type Post { author: User }".into());

    let error = Registry::from_source(&source, CrudConfig::default()).unwrap_err();

    assert!(matches!(error, BuildError::SchemaIncomplete(_)), "{error}");
}
