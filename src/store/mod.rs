//! Relational store
//!
//! The authoritative side of cache-aside. Repositories talk to these traits
//! only; Postgres backs them in production, and in-memory versions back
//! them in tests.
//!
//! Store methods return `Ok(None)` / empty vectors for "no rows" and leave
//! the not-found decision to the repository.

pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Category, NewCategory, NewProduct, Product, ProductUpdate, Role, UserCredentials, UserProfile,
};

pub use self::postgres::{PgCatalogStore, PgUserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use self::memory::{MemoryCatalogStore, MemoryUserStore};

/// Product and category persistence
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Liveness check
    async fn ping(&self) -> AppResult<()>;

    async fn insert_product(&self, public_id: &str, product: &NewProduct) -> AppResult<Product>;

    /// Partial update; `None` when no product has `id`
    async fn update_product(&self, id: i32, update: &ProductUpdate) -> AppResult<Option<Product>>;

    /// Delete and return the removed row
    async fn delete_product(&self, id: i32) -> AppResult<Option<Product>>;

    async fn list_products(&self) -> AppResult<Vec<Product>>;

    async fn product_by_id(&self, id: i32) -> AppResult<Option<Product>>;

    async fn product_by_public_id(&self, public_id: &str) -> AppResult<Option<Product>>;

    async fn insert_category(&self, category: &NewCategory) -> AppResult<Category>;

    /// Delete and return the removed row
    async fn delete_category(&self, id: i32) -> AppResult<Option<Category>>;

    async fn list_categories(&self) -> AppResult<Vec<Category>>;
}

/// Account persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Liveness check
    async fn ping(&self) -> AppResult<()>;

    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    /// Insert an account; a duplicate email surfaces as `Conflict`
    async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<i32>;

    async fn credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    async fn profile_by_id(&self, id: i32) -> AppResult<Option<UserProfile>>;

    async fn count_with_role(&self, role: Role) -> AppResult<i64>;
}
