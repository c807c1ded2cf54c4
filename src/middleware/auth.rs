//! Authentication middleware
//!
//! Verifies bearer tokens locally with the token service and gates admin
//! routes on the verified role. Authentication always runs before the role
//! check, so a bad token on an admin route is reported as such rather than
//! as a permission problem.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::{
    auth::TokenService, error::AppError, models::Role, routes::metrics::record_auth_failure,
    AppState,
};

/// Verified identity attached to the request
///
/// Inserted into request extensions by the middleware; handlers read it with
/// `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub role: Role,
}

/// Extract the Authorization header and return the bearer token
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Resolve the caller's identity from request headers
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<AuthenticatedUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::InvalidToken)?;

    let token = extract_bearer_token(auth_header).ok_or(AppError::InvalidToken)?;

    let claims = tokens.verify(token).map_err(|e| {
        warn!(error = %e, "Token rejected");
        AppError::from(e)
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.id,
        role: claims.role,
    })
}

/// Check that `user` holds `required`
pub fn authorize(user: &AuthenticatedUser, required: Role) -> Result<(), AppError> {
    match (required, user.role) {
        (Role::Customer, _) | (Role::Admin, Role::Admin) => Ok(()),
        (Role::Admin, Role::Customer) => Err(AppError::Forbidden),
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the token from the Authorization header
/// 2. Verifies signature and expiry
/// 3. Adds AuthenticatedUser to request extensions
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state.tokens, request.headers()).map_err(reject)?;

    debug!(user_id = user.user_id, role = %user.role, "User authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Admin gate
///
/// Same as [`auth_middleware`], then requires the admin role.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state.tokens, request.headers()).map_err(reject)?;

    if let Err(e) = authorize(&user, Role::Admin) {
        warn!(user_id = user.user_id, role = %user.role, "Admin route refused");
        return Err(reject(e));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn reject(error: AppError) -> AppError {
    if error.is_auth_failure() {
        let kind = match &error {
            AppError::Unauthorized => "missing_header",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden => "forbidden",
            _ => "other",
        };
        record_auth_failure(kind);
    }
    error
}
