#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use crud_schema::{
    type_graph::SdlSource, CrudConfig, Engine, IncludePath, MemoryStorage, Registry, Request, StorageCall,
};
use serde_json::{json, Value};

const SCHEMA: &str = r"
    interface Node {
        id: ID!
    }

    type Company implements Node {
        id: ID!
        name: String
    }

    type User implements Node {
        id: ID!
        name: String
        company: Company
    }

    type Post implements Node {
        id: ID!
        title: String
        author: User
    }
";

async fn seeded() -> (Engine, Arc<MemoryStorage>) {
    let registry = Registry::from_source(&SdlSource::Inline(SCHEMA.to_string()), CrudConfig::default()).unwrap();
    let storage = Arc::new(MemoryStorage::new(Arc::clone(registry.graph()), "id"));
    let engine = Engine::new(Arc::new(registry), storage.clone());

    let response = engine
        .execute(Request::new(
            r#"mutation {
                first: createPost(title: "One", author: { name: "Jane", company: { name: "Acme" } })
                second: createPost(title: "Two", authorId: "2")
            }"#,
        ))
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    (engine, storage)
}

fn finds(storage: &MemoryStorage) -> Vec<StorageCall> {
    storage
        .journal()
        .into_iter()
        .filter(|call| matches!(call, StorageCall::Find { .. }))
        .collect()
}

#[tokio::test]
async fn get_all_eager_loads_the_selected_relations() {
    let (engine, storage) = seeded().await;

    let response = engine
        .execute(Request::new("{ allPosts { title author { name company { name } } } }"))
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data["allPosts"][1],
        json!({
            "__typename": "Post",
            "id": "4",
            "title": "Two",
            "author": {
                "__typename": "User",
                "id": "2",
                "name": "Jane",
                "company": { "__typename": "Company", "id": "1", "name": "Acme" }
            }
        })
    );
    assert_eq!(
        finds(&storage),
        [StorageCall::Find {
            type_name: "Post".into(),
            ids: None,
            includes: vec![IncludePath::from(["author"]), IncludePath::from(["author", "company"])],
        }]
    );
}

#[tokio::test]
async fn unselected_relations_stay_identifiers() {
    let (engine, _) = seeded().await;

    let response = engine.execute(Request::new("{ allPosts { title } }")).await;

    assert_eq!(
        response.data["allPosts"]
            .as_array()
            .map(|posts| posts.iter().map(|post| post["author"].clone()).collect::<Vec<_>>()),
        Some(vec![json!("2"), json!("2")])
    );
}

#[tokio::test]
async fn get_single_by_identifier() {
    let (engine, storage) = seeded().await;

    let response = engine
        .execute(Request::new(r#"{ post: Post(id: "3") { author { name } } missing: Post(id: "99") }"#))
        .await;

    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data["post"]["title"], json!("One"));
    assert_eq!(response.data["post"]["author"]["name"], json!("Jane"));
    assert_eq!(response.data["missing"], Value::Null);
    assert_eq!(finds(&storage).len(), 2);
}

#[tokio::test]
async fn identifier_from_a_variable() {
    let (engine, _) = seeded().await;
    let variables = serde_json::from_value(json!({ "id": "1" })).unwrap();

    let response = engine
        .execute(Request::new("query Company($id: ID!) { Company(id: $id) }").variables(variables))
        .await;

    assert_eq!(
        response.data,
        json!({ "Company": { "__typename": "Company", "id": "1", "name": "Acme" } })
    );
}

#[tokio::test]
async fn requests_deserialize_from_the_wire_format() {
    let (engine, _) = seeded().await;

    let request: Request = serde_json::from_value(json!({
        "query": "query A { allCompanies } query B { allUsers { company { name } } }",
        "operationName": "B",
    }))
    .unwrap();

    let response = engine.execute(request).await;

    assert_eq!(response.data["allUsers"][0]["company"]["name"], json!("Acme"));
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "data": response.data.clone() })
    );
}

#[tokio::test]
async fn subscriptions_are_refused() {
    let (engine, _) = seeded().await;

    let response = engine.execute(Request::new("subscription { allPosts }")).await;

    assert_eq!(response.data, Value::Null);
    assert_eq!(response.errors[0].message, "Subscriptions are not supported.");
}
