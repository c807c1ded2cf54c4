//! Storefront - product catalog and account API
//!
//! This library provides the core of the storefront server: a cache-aside
//! Redis layer in front of Postgres for catalog and profile reads, and
//! stateless bearer-token authentication with role gating.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod store;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

pub use crate::auth::TokenService;
pub use crate::cache::{CacheClient, CacheSettings, KvStore, RedisStore};
pub use crate::config::Config;
pub use crate::repository::{AccountRepository, ProductRepository};
pub use crate::store::{CatalogStore, PgCatalogStore, PgUserStore, UserStore};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    pub cache: CacheClient,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub user_store: Arc<dyn UserStore>,
    pub tokens: TokenService,
    pub products: ProductRepository,
    pub accounts: AccountRepository,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails when Redis is unreachable or does not echo back the startup
    /// probe, when Postgres is unreachable or migrations fail, or when no
    /// admin exists and none can be created.
    pub async fn new(config: Config) -> Result<Self> {
        // Initialize Redis and verify round-trip before serving
        let redis = RedisStore::connect(&config.redis_url, config.redis_password.as_deref())
            .await
            .context("failed to connect to Redis")?;
        let cache = CacheClient::connect(Arc::new(redis), CacheSettings::from_config(&config))
            .await
            .context("Redis startup probe failed")?;
        info!("Cache connected");

        // Initialize Postgres
        let pool = store::postgres::connect_pool(&config)
            .await
            .context("failed to connect to Postgres")?;
        store::postgres::migrate(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database connected");

        let catalog_store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool.clone()));
        let user_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));

        let state = Self::from_parts(config, cache, catalog_store, user_store);
        state.bootstrap_admin().await?;
        Ok(state)
    }

    /// Assemble state from already-connected parts
    pub fn from_parts(
        config: Config,
        cache: CacheClient,
        catalog_store: Arc<dyn CatalogStore>,
        user_store: Arc<dyn UserStore>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_seconds);
        let products = ProductRepository::new(catalog_store.clone(), cache.clone());
        let accounts = AccountRepository::new(user_store.clone(), cache.clone(), tokens.clone());

        Self {
            config,
            start_time: Instant::now(),
            cache,
            catalog_store,
            user_store,
            tokens,
            products,
            accounts,
        }
    }

    /// Create the configured admin account if no admin exists yet
    pub async fn bootstrap_admin(&self) -> Result<()> {
        let created = self
            .accounts
            .ensure_admin(&self.config.admin_email, self.config.admin_password.as_deref())
            .await
            .context("admin bootstrap failed")?;
        if created {
            info!(email = %self.config.admin_email, "Admin account created");
        }
        Ok(())
    }

    /// Create an application state backed entirely by in-memory stores
    ///
    /// Used by tests that exercise the HTTP surface without Redis or
    /// Postgres. The returned handles let tests inspect or break the cache.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory(config: Config) -> TestHandles {
        let kv = Arc::new(cache::InMemoryStore::new());
        let catalog = Arc::new(store::MemoryCatalogStore::new());
        let users = Arc::new(store::MemoryUserStore::new());
        let cache = CacheClient::new(kv.clone(), CacheSettings::from_config(&config));

        let state = Arc::new(Self::from_parts(
            config,
            cache,
            catalog.clone(),
            users.clone(),
        ));

        TestHandles {
            state,
            kv,
            catalog,
            users,
        }
    }
}

/// State plus the concrete in-memory backends behind it
#[cfg(any(test, feature = "test-utils"))]
pub struct TestHandles {
    pub state: Arc<AppState>,
    pub kv: Arc<cache::InMemoryStore>,
    pub catalog: Arc<store::MemoryCatalogStore>,
    pub users: Arc<store::MemoryUserStore>,
}
