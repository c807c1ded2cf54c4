//! Catalog endpoints
//!
//! Reads are public and go through the cache. Writes sit behind the admin
//! gate and return only after the affected cache keys are gone.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Category, NewCategory, NewProduct, Product, ProductUpdate},
    routes::{ApiResponse, Payload},
    AppState,
};

/// `?id=<n>`
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: i32,
}

/// `?public_id=<s>`
#[derive(Debug, Deserialize)]
pub struct PublicIdQuery {
    pub public_id: String,
}

/// List all products
pub async fn list_all(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.list_all().await?;
    Ok(Json(ApiResponse::new("products found", products)))
}

/// Get a product by primary key
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.products.by_id(query.id).await?;
    Ok(Json(ApiResponse::new("product found", product)))
}

/// Get a product by public id
pub async fn get_by_public_id(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PublicIdQuery>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.products.by_public_id(&query.public_id).await?;
    Ok(Json(ApiResponse::new("product found", product)))
}

/// List all categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.products.list_categories().await?;
    Ok(Json(ApiResponse::new("categories found", categories)))
}

/// Create a product (admin)
pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<NewProduct>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = state.products.create(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("product created", product)),
    ))
}

/// Partially update a product (admin)
pub async fn update(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
    Payload(body): Payload<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.products.update(query.id, &body).await?;
    Ok(Json(ApiResponse::new("product updated", product)))
}

/// Delete a product (admin)
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = state.products.delete(query.id).await?;
    Ok(Json(ApiResponse::new("product deleted", product)))
}

/// Create a category (admin)
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<NewCategory>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = state.products.create_category(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("category created", category)),
    ))
}

/// Delete a category (admin)
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = state.products.delete_category(query.id).await?;
    Ok(Json(ApiResponse::new("category deleted", category)))
}
