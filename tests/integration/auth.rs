//! Account and access-control integration tests
//!
//! Registration, login, the cached profile, and how the bearer and admin
//! gates answer each kind of bad request.

use axum::http::{HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use storefront::{cache::keys, models::Role};

use crate::common::{authorization, bearer, constants, fixtures, TestApp};

fn error_code(response: &axum_test::TestResponse) -> String {
    let json: Value = response.json();
    json["error"]["code"]
        .as_str()
        .expect("error envelope should carry a code")
        .to_string()
}

#[tokio::test]
async fn test_register_returns_created_id() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/register")
        .json(&fixtures::register("bob@example.com", "hunter22"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json: Value = response.json();
    // The bootstrap admin holds id 1
    assert_eq!(json["data"], json!({ "id": 2 }));
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let app = TestApp::new().await;
    let body = fixtures::register("bob@example.com", "hunter22");

    app.server
        .post("/api/v1/auth/register")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.post("/api/v1/auth/register").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(error_code(&response), "CONFLICT");
}

#[tokio::test]
async fn test_login_returns_verifiable_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&fixtures::login(constants::ADMIN_EMAIL, constants::ADMIN_PASSWORD))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["data"]["expires_in"], 300);

    let token = json["data"]["token"].as_str().expect("token");
    let claims = app.state.tokens.verify(token).expect("token should verify");
    assert_eq!(claims.id, 1);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.exp - claims.iat, 300);
}

#[tokio::test]
async fn test_wrong_password_differs_from_unknown_account() {
    let app = TestApp::new().await;
    app.customer_token().await;

    let wrong_password = app
        .server
        .post("/api/v1/auth/login")
        .json(&fixtures::login(constants::CUSTOMER_EMAIL, "not-the-password"))
        .await;
    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&wrong_password), "INVALID_CREDENTIALS");

    let unknown = app
        .server
        .post("/api/v1/auth/login")
        .json(&fixtures::login("nobody@example.com", "whatever"))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_code(&unknown), "NOT_FOUND");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/v1/auth/profile").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&response), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_profile_is_cached_per_subject() {
    let app = TestApp::new().await;
    let token = app.customer_token().await;

    for _ in 0..2 {
        let response = app
            .server
            .get("/api/v1/auth/profile")
            .add_header(authorization(), bearer(&token))
            .await;
        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["data"]["email"], constants::CUSTOMER_EMAIL);
        assert_eq!(json["data"]["role"], "customer");
        assert!(json["data"].get("password_hash").is_none());
    }

    assert_eq!(app.users.reads(), 1);
    assert!(app.kv.contains(&keys::user_profile(2)).await);
}

#[tokio::test]
async fn test_malformed_authorization_header_is_invalid_token() {
    let app = TestApp::new().await;

    for value in ["Basic dXNlcjpwYXNz", "Bearer ", "Bearer not.a.jwt", "token-without-scheme"] {
        let response = app
            .server
            .get("/api/v1/auth/profile")
            .add_header(authorization(), HeaderValue::from_static(value))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&response), "INVALID_TOKEN", "header: {value:?}");
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let issued_long_ago = chrono::Utc::now().timestamp() - 3_600;
    let token = app.token_issued_at(1, Role::Admin, issued_long_ago);

    let response = app
        .server
        .get("/api/v1/auth/profile")
        .add_header(authorization(), bearer(&token))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&response), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let app = TestApp::new().await;
    let forged = storefront::TokenService::new("some-other-secret", 300)
        .issue(1, Role::Admin)
        .expect("issue");

    let response = app
        .server
        .delete("/api/v1/product")
        .add_query_param("id", 1)
        .add_header(authorization(), bearer(&forged))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&response), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_customer_on_admin_route_is_forbidden() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = app.create_product(&admin, "Teapot").await;
    let customer = app.customer_token().await;

    let response = app
        .server
        .delete("/api/v1/product")
        .add_query_param("id", created["id"].as_i64().expect("id"))
        .add_header(authorization(), bearer(&customer))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(error_code(&response), "FORBIDDEN");

    // Nothing was deleted
    app.server
        .get("/api/v1/product/id")
        .add_query_param("id", created["id"].as_i64().expect("id"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_admin_route_without_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/v1/product")
        .json(&fixtures::new_product("Teapot"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&response), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_public_reads_ignore_authorization() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_product(&admin, "Teapot").await;

    // Even a garbage header does not block a public route
    app.server
        .get("/api/v1/product")
        .add_header(authorization(), HeaderValue::from_static("Bearer garbage"))
        .await
        .assert_status_ok();
}
