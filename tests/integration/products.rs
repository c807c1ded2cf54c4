//! Catalog endpoint integration tests
//!
//! Public reads, admin-only writes, and the cache state each one leaves
//! behind.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use storefront::cache::keys;

use crate::common::{authorization, bearer, fixtures, TestApp};

#[tokio::test]
async fn test_empty_catalog_is_not_found() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/product").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert!(!app.kv.contains(&keys::products_all()).await);
}

#[tokio::test]
async fn test_created_product_shows_up_in_list() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let created = app.create_product(&admin, "Teapot").await;
    assert_eq!(created["name"], "Teapot");
    assert_eq!(created["weight_unit"], "g");
    assert!(created["public_id"].as_str().is_some_and(|s| !s.is_empty()));

    // Create only invalidates; the list is cached by the next read
    assert!(!app.kv.contains(&keys::products_all()).await);

    let response = app.server.get("/api/v1/product").await;
    response.assert_status_ok();
    let json: Value = response.json();
    let products = json["data"].as_array().expect("data should be a list");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0], created);

    assert!(app.kv.contains(&keys::products_all()).await);
}

#[tokio::test]
async fn test_second_create_invalidates_cached_list() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    app.create_product(&admin, "Teapot").await;
    app.server.get("/api/v1/product").await.assert_status_ok();

    let second = app.create_product(&admin, "Kettle").await;

    let json: Value = app.server.get("/api/v1/product").await.json();
    let products = json["data"].as_array().expect("data should be a list");
    assert_eq!(products.len(), 2);
    assert!(products.contains(&second));
}

#[tokio::test]
async fn test_point_reads_are_served_from_cache() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = app.create_product(&admin, "Teapot").await;
    let id = created["id"].as_i64().expect("id should be numeric");

    for _ in 0..3 {
        let response = app
            .server
            .get("/api/v1/product/id")
            .add_query_param("id", id)
            .await;
        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["data"], created);
    }

    assert_eq!(app.catalog.reads(), 1);
    assert!(app.kv.contains(&keys::product_by_id(id as i32)).await);
}

#[tokio::test]
async fn test_read_by_public_id() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = app.create_product(&admin, "Teapot").await;
    let public_id = created["public_id"].as_str().expect("public_id").to_string();

    let response = app
        .server
        .get("/api/v1/product/public")
        .add_query_param("public_id", &public_id)
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["id"], created["id"]);
    assert!(app.kv.contains(&keys::product_by_public_id(&public_id)).await);

    let response = app
        .server
        .get("/api/v1/product/public")
        .add_query_param("public_id", "does-not-exist")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_is_visible_immediately() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = app.create_product(&admin, "Teapot").await;
    let id = created["id"].as_i64().expect("id should be numeric");

    // Warm the cache
    app.server
        .get("/api/v1/product/id")
        .add_query_param("id", id)
        .await
        .assert_status_ok();

    let response = app
        .server
        .patch("/api/v1/product")
        .add_query_param("id", id)
        .add_header(authorization(), bearer(&admin))
        .json(&json!({ "price": 20.0, "weight_unit": "kg" }))
        .await;
    response.assert_status_ok();

    let json: Value = app
        .server
        .get("/api/v1/product/id")
        .add_query_param("id", id)
        .await
        .json();
    assert_eq!(json["data"]["price"], 20.0);
    assert_eq!(json["data"]["weight_unit"], "kg");
    assert_eq!(json["data"]["name"], "Teapot");
}

#[tokio::test]
async fn test_delete_then_read_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = app.create_product(&admin, "Teapot").await;
    let id = created["id"].as_i64().expect("id should be numeric");

    app.server
        .get("/api/v1/product/id")
        .add_query_param("id", id)
        .await
        .assert_status_ok();

    let response = app
        .server
        .delete("/api/v1/product")
        .add_query_param("id", id)
        .add_header(authorization(), bearer(&admin))
        .await;
    response.assert_status_ok();

    app.server
        .get("/api/v1/product/id")
        .add_query_param("id", id)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Deleting again finds nothing
    app.server
        .delete("/api/v1/product")
        .add_query_param("id", id)
        .add_header(authorization(), bearer(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app
        .server
        .post("/api/v1/product/category")
        .add_header(authorization(), bearer(&admin))
        .json(&json!({ "name": "Kitchen" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let category: Value = response.json();
    let id = category["data"]["id"].as_i64().expect("id should be numeric");

    let json: Value = app.server.get("/api/v1/product/category").await.json();
    assert_eq!(json["data"], json!([{ "id": id, "name": "Kitchen" }]));
    assert!(app.kv.contains(&keys::product_categories()).await);

    app.server
        .delete("/api/v1/product/category")
        .add_query_param("id", id)
        .add_header(authorization(), bearer(&admin))
        .await
        .assert_status_ok();
    assert!(!app.kv.contains(&keys::product_categories()).await);

    app.server
        .get("/api/v1/product/category")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_write_with_cache_down_reports_stale_cache() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.kv.set_failing(true);

    let response = app
        .server
        .post("/api/v1/product")
        .add_header(authorization(), bearer(&admin))
        .json(&fixtures::new_product("Teapot"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "CACHE_INVALIDATION_FAILED");

    // The row was written regardless, and reads fall back to the store
    let json: Value = app.server.get("/api/v1/product").await.json();
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app
        .server
        .post("/api/v1/product")
        .add_header(authorization(), bearer(&admin))
        .json(&json!({ "name": "Teapot" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}
