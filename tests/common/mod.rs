//! Common test utilities for the storefront API
//!
//! Builds the real router over in-memory stores so the HTTP surface can be
//! exercised without Redis or Postgres.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};

use storefront::{
    cache::InMemoryStore,
    models::Role,
    routes,
    store::{MemoryCatalogStore, MemoryUserStore},
    AppState, Config,
};

/// Test configuration constants
pub mod constants {
    /// Bootstrap admin email (matches `Config::for_testing`)
    pub const ADMIN_EMAIL: &str = "admin@admin.com";
    /// Bootstrap admin password (matches `Config::for_testing`)
    pub const ADMIN_PASSWORD: &str = "admin-password";
    /// Default customer email
    pub const CUSTOMER_EMAIL: &str = "alice@example.com";
    /// Default customer password
    pub const CUSTOMER_PASSWORD: &str = "wonderland";
}

/// Request payload fixtures
pub mod fixtures {
    use super::*;

    pub fn new_product(name: &str) -> Value {
        json!({
            "name": name,
            "price": 12.5,
            "stock": 3,
            "category_id": 1,
            "weight_unit": "g",
            "weight_value": 250.0,
            "images": ["front.png", "back.png"]
        })
    }

    pub fn register(email: &str, password: &str) -> Value {
        json!({
            "first_name": "Alice",
            "last_name": "Liddell",
            "email": email,
            "password": password
        })
    }

    pub fn login(email: &str, password: &str) -> Value {
        json!({
            "email": email,
            "password": password
        })
    }
}

/// Full application over in-memory backends
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub kv: Arc<InMemoryStore>,
    pub catalog: Arc<MemoryCatalogStore>,
    pub users: Arc<MemoryUserStore>,
}

impl TestApp {
    /// Create the app and bootstrap the admin account
    pub async fn new() -> Self {
        Self::with_config(Config::for_testing()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let handles = AppState::in_memory(config);
        handles
            .state
            .bootstrap_admin()
            .await
            .expect("admin bootstrap should succeed");

        let app = routes::create_router(handles.state.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            state: handles.state,
            kv: handles.kv,
            catalog: handles.catalog,
            users: handles.users,
        }
    }

    /// Log in over HTTP and return the issued token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/v1/auth/login")
            .json(&fixtures::login(email, password))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        body["data"]["token"]
            .as_str()
            .expect("login response should carry a token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(constants::ADMIN_EMAIL, constants::ADMIN_PASSWORD)
            .await
    }

    /// Register the default customer and log them in
    pub async fn customer_token(&self) -> String {
        self.server
            .post("/api/v1/auth/register")
            .json(&fixtures::register(
                constants::CUSTOMER_EMAIL,
                constants::CUSTOMER_PASSWORD,
            ))
            .await;
        self.login(constants::CUSTOMER_EMAIL, constants::CUSTOMER_PASSWORD)
            .await
    }

    /// Token signed with the app's key, issued at an arbitrary time
    pub fn token_issued_at(&self, subject_id: i32, role: Role, issued_at: i64) -> String {
        self.state
            .tokens
            .issue_at(subject_id, role, issued_at)
            .expect("token issuance should succeed")
    }

    /// Create a product as admin and return the response data
    pub async fn create_product(&self, admin_token: &str, name: &str) -> Value {
        let response = self
            .server
            .post("/api/v1/product")
            .add_header(authorization(), bearer(admin_token))
            .json(&fixtures::new_product(name))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        body["data"].clone()
    }
}

pub fn authorization() -> HeaderName {
    axum::http::header::AUTHORIZATION
}

pub fn bearer(token: &str) -> HeaderValue {
    format!("Bearer {}", token)
        .parse()
        .expect("token should be a valid header value")
}
