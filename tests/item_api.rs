//! Item API Tests
//!
//! Drives the full router in-process: routing, validation, session
//! handling, storage and error mapping.

use std::fs;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use itemstore::http_server::{build_router, HttpServerConfig};
use itemstore::session::ItemStore;
use itemstore::storage::table_path;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// Test Utilities
// =============================================================================

struct TestApp {
    _temp_dir: TempDir,
    store: Arc<ItemStore>,
    router: Router,
}

impl TestApp {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self::open(temp_dir)
    }

    fn open(temp_dir: TempDir) -> Self {
        let store = Arc::new(ItemStore::open(temp_dir.path()).expect("Failed to open store"));
        let router = build_router(&HttpServerConfig::default(), Arc::clone(&store));
        Self {
            _temp_dir: temp_dir,
            store,
            router,
        }
    }

    async fn send(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, name: &str, price: f64) -> Value {
        let body = json!({"name": name, "price": price}).to_string();
        let (status, value) = self.json("POST", "/items/", Some(&body)).await;
        assert_eq!(status, StatusCode::CREATED);
        value
    }
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[tokio::test]
async fn test_widget_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app
        .json("POST", "/items/", Some(r#"{"name":"Widget","price":9.99}"#))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created,
        json!({"id": 1, "name": "Widget", "description": null, "price": 9.99, "tax": null})
    );

    let (status, fetched) = app.json("GET", "/items/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = app
        .json("PUT", "/items/1", Some(r#"{"name":"Widget2","price":19.99}"#))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated,
        json!({"id": 1, "name": "Widget2", "description": null, "price": 19.99, "tax": null})
    );

    let (status, body) = app.send("DELETE", "/items/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, missing) = app.json("GET", "/items/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing, json!({"detail": "Item not found"}));
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_assigns_unique_ids_and_roundtrips() {
    let app = TestApp::new();

    let (status, created) = app
        .json(
            "POST",
            "/items",
            Some(r#"{"name":"Gadget","description":"shiny","price":5,"tax":0.5}"#),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let second = app.create("Other", 1.0).await;
    assert_ne!(created["id"], second["id"]);

    let uri = format!("/items/{}", created["id"]);
    let (_, fetched) = app.json("GET", &uri, None).await;
    assert_eq!(fetched["name"], "Gadget");
    assert_eq!(fetched["description"], "shiny");
    assert_eq!(fetched["price"], 5.0);
    assert_eq!(fetched["tax"], 0.5);
}

#[tokio::test]
async fn test_create_rejects_missing_and_mistyped_fields() {
    let app = TestApp::new();

    let (status, body) = app.json("POST", "/items/", Some(r#"{"description":"x"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let locs: Vec<Value> = body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["loc"].clone())
        .collect();
    assert_eq!(locs, vec![json!(["body", "name"]), json!(["body", "price"])]);

    let (status, body) = app
        .json("POST", "/items/", Some(r#"{"name":"x","price":"cheap"}"#))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "float_type");

    let (status, body) = app.json("POST", "/items/", Some("not json")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");

    // Nothing reached storage
    assert_eq!(app.store.item_count().unwrap(), 0);
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_empty_store() {
    let app = TestApp::new();
    let (status, body) = app.json("GET", "/items/?skip=0&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_pagination_in_id_order() {
    let app = TestApp::new();
    for i in 0..15 {
        app.create(&format!("item{}", i), i as f64).await;
    }

    let (_, page) = app.json("GET", "/items/", None).await;
    let ids: Vec<i64> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());

    let (_, page) = app.json("GET", "/items/?skip=12&limit=10", None).await;
    assert_eq!(page.as_array().unwrap().len(), 3);
    assert_eq!(page[0]["id"], 13);

    let (_, page) = app.json("GET", "/items/?skip=100", None).await;
    assert_eq!(page, json!([]));
}

#[tokio::test]
async fn test_list_rejects_bad_query() {
    let app = TestApp::new();

    let (status, body) = app.json("GET", "/items/?skip=-1", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["query", "skip"]));

    let (status, body) = app.json("GET", "/items/?limit=ten", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["query", "limit"]));
}

// =============================================================================
// Get / Update / Delete
// =============================================================================

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = TestApp::new();
    let payload = r#"{"name":"x","price":1}"#;

    for (method, body) in [("GET", None), ("PUT", Some(payload)), ("DELETE", None)] {
        let (status, value) = app.json(method, "/items/42", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} /items/42", method);
        assert_eq!(value, json!({"detail": "Item not found"}));
    }
}

#[tokio::test]
async fn test_non_integer_id_is_validation_error() {
    let app = TestApp::new();
    let (status, body) = app.json("GET", "/items/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["path", "item_id"]));
}

#[tokio::test]
async fn test_update_replaces_whole_record_and_is_idempotent() {
    let app = TestApp::new();
    let (_, created) = app
        .json(
            "POST",
            "/items/",
            Some(r#"{"name":"a","description":"old","price":1,"tax":0.1}"#),
        )
        .await;
    let uri = format!("/items/{}", created["id"]);
    let payload = r#"{"name":"b","price":2}"#;

    let (status, first) = app.json("PUT", &uri, Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["description"], Value::Null);
    assert_eq!(first["tax"], Value::Null);

    let (_, second) = app.json("PUT", &uri, Some(payload)).await;
    assert_eq!(first, second);

    let (_, fetched) = app.json("GET", &uri, None).await;
    assert_eq!(fetched, second);
}

#[tokio::test]
async fn test_update_validates_before_lookup() {
    let app = TestApp::new();
    let (status, _) = app.json("PUT", "/items/1", Some(r#"{"name":"x"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_then_get_not_found_and_id_not_reused() {
    let app = TestApp::new();
    let first = app.create("a", 1.0).await;
    let uri = format!("/items/{}", first["id"]);

    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.json("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let next = app.create("b", 2.0).await;
    assert_ne!(next["id"], first["id"]);
}

// =============================================================================
// Sessions, persistence, health
// =============================================================================

#[tokio::test]
async fn test_sessions_released_after_every_request() {
    let app = TestApp::new();
    app.create("a", 1.0).await;
    app.json("GET", "/items/99", None).await;
    app.json("POST", "/items/", Some("{}")).await;
    app.json("GET", "/items/", None).await;

    assert_eq!(app.store.open_sessions(), 0);
}

#[tokio::test]
async fn test_items_survive_restart() {
    let app = TestApp::new();
    app.create("kept", 3.0).await;
    let removed = app.create("removed", 4.0).await;
    app.send("DELETE", &format!("/items/{}", removed["id"]), None)
        .await;

    // Close the store, keep the data directory
    let TestApp {
        _temp_dir,
        store,
        router,
    } = app;
    drop(router);
    drop(store);
    let reopened = TestApp::open(_temp_dir);

    let (_, items) = reopened.json("GET", "/items/", None).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["name"], "kept");

    let next = reopened.create("new", 5.0).await;
    assert_eq!(next["id"], 3);
}

#[tokio::test]
async fn test_storage_failure_is_internal_server_error() {
    let app = TestApp::new();
    app.create("a", 1.0).await;

    // Damage the stored body of item 1 underneath the open store
    let path = table_path(app._temp_dir.path());
    let mut contents = fs::read(&path).unwrap();
    contents[20] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let (status, body) = app.json("GET", "/items/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Internal Server Error"}));
    assert_eq!(app.store.open_sessions(), 0);
}

#[tokio::test]
async fn test_health_reports_counts() {
    let app = TestApp::new();
    app.create("a", 1.0).await;

    let (status, body) = app.json("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["items"], 1);
    assert_eq!(body["open_sessions"], 0);
}
