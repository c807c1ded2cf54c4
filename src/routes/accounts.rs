//! Account endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::{LoginRequest, RegisterRequest, UserProfile},
    routes::{ApiResponse, Payload},
    AppState,
};

/// Data returned after registration
#[derive(Debug, Serialize)]
pub struct Registered {
    pub id: i32,
}

/// Data returned after login
#[derive(Debug, Serialize)]
pub struct TokenPayload {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Register a customer account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Registered>>)> {
    let id = state.accounts.register(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("account created successfully", Registered { id })),
    ))
}

/// Exchange credentials for an access token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Payload(body): Payload<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPayload>>> {
    let token = state.accounts.login(body).await?;
    Ok(Json(ApiResponse::new(
        "login success",
        TokenPayload {
            token,
            expires_in: state.tokens.lifetime_secs(),
        },
    )))
}

/// Profile of the authenticated caller
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.accounts.profile(user.user_id).await?;
    Ok(Json(ApiResponse::new("user profile", profile)))
}
