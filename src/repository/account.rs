//! Account repository
//!
//! Registration, login and the cached per-subject profile.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenService;
use crate::cache::{keys, CacheClient};
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, RegisterRequest, Role, UserProfile};
use crate::repository::read_through;
use crate::store::UserStore;

/// Account access backed by the user store, the cache and the token service
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn UserStore>,
    cache: CacheClient,
    tokens: TokenService,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn UserStore>, cache: CacheClient, tokens: TokenService) -> Self {
        Self {
            store,
            cache,
            tokens,
        }
    }

    /// Create a customer account, returning its id
    ///
    /// A taken email is a `Conflict`, checked before hashing and again by
    /// the store's uniqueness constraint.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> AppResult<i32> {
        if self.store.email_exists(&request.email).await? {
            return Err(AppError::Conflict("email already in use".to_string()));
        }

        let password_hash = hash_blocking(request.password).await?;
        let id = self
            .store
            .insert_user(
                &request.first_name,
                &request.last_name,
                &request.email,
                &password_hash,
                Role::Customer,
            )
            .await?;

        info!(user_id = id, "Account registered");
        Ok(id)
    }

    /// Check credentials and issue an access token
    ///
    /// An unknown email is `NotFound`; a known email with the wrong password
    /// is `InvalidCredentials`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> AppResult<String> {
        let credentials = self
            .store
            .credentials_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::not_found("account"))?;

        if !verify_blocking(request.password, credentials.password_hash).await? {
            warn!(user_id = credentials.id, "Login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        Ok(self.tokens.issue(credentials.id, credentials.role)?)
    }

    /// Profile of `user_id`, read through `users:id:<id>`
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: i32) -> AppResult<UserProfile> {
        read_through(&self.cache, &keys::user_profile(user_id), "account", || {
            self.store.profile_by_id(user_id)
        })
        .await
    }

    /// Make sure at least one admin account exists
    ///
    /// Returns `true` when an admin was created. With no admin and no
    /// password to create one, this fails.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: Option<&str>) -> AppResult<bool> {
        if self.store.count_with_role(Role::Admin).await? > 0 {
            return Ok(false);
        }

        let password = password.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "no admin account exists and ADMIN_PASSWORD is not set"
            ))
        })?;

        let password_hash = hash_blocking(password.to_string()).await?;
        let id = self
            .store
            .insert_user("John", "Doe", email, &password_hash, Role::Admin)
            .await?;

        info!(user_id = id, "Bootstrap admin created");
        Ok(true)
    }
}

async fn hash_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

async fn verify_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}
