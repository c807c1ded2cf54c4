//! HTTP routes for the storefront API
//!
//! Public catalog reads, account endpoints behind the bearer check, and
//! catalog writes behind the admin gate.

pub mod accounts;
pub mod health;
pub mod metrics;
pub mod products;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    middleware,
    routing::{get, post},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    middleware::auth::{admin_middleware, auth_middleware},
    AppState,
};

/// Success envelope shared by every API handler
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// JSON request body whose rejections use the API error envelope
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        serde_json::from_slice(&body)
            .map(Payload)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
    }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/api/v1/auth/register", post(accounts::register))
        .route("/api/v1/auth/login", post(accounts::login))
        .route("/api/v1/product", get(products::list_all))
        .route("/api/v1/product/id", get(products::get_by_id))
        .route("/api/v1/product/public", get(products::get_by_public_id))
        .route("/api/v1/product/category", get(products::list_categories));

    let authenticated_routes = Router::new()
        .route("/api/v1/auth/profile", get(accounts::profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Same paths as the public reads, different methods. Gates use
    // route_layer so unmatched paths and methods fall through untouched.
    let admin_routes = Router::new()
        .route(
            "/api/v1/product",
            post(products::create)
                .patch(products::update)
                .delete(products::delete),
        )
        .route(
            "/api/v1/product/category",
            post(products::create_category).delete(products::delete_category),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(admin_routes)
        // Global middleware (applied to all routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
