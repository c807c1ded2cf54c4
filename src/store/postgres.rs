//! Postgres-backed stores
//!
//! Plain parameterized queries over a shared `PgPool`; no caching here.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    Category, NewCategory, NewProduct, Product, ProductUpdate, Role, UserCredentials, UserProfile,
};
use crate::store::{CatalogStore, UserStore};

const PRODUCT_COLUMNS: &str = "id, public_id, name, price, stock, category_id, weight_unit, \
     weight_value, images, created_at, updated_at";

/// Open the shared connection pool
///
/// The acquire timeout bounds how long any single query waits for a
/// connection.
pub async fn connect_pool(config: &Config) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_seconds))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Run pending schema migrations
pub async fn migrate(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Catalog store over Postgres
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_product(&self, public_id: &str, product: &NewProduct) -> AppResult<Product> {
        let query = format!(
            "INSERT INTO products \
             (public_id, name, price, stock, category_id, weight_unit, weight_value, images) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Product>(&query)
            .bind(public_id)
            .bind(&product.name)
            .bind(product.price)
            .bind(product.stock)
            .bind(product.category_id)
            .bind(product.weight_unit.as_str())
            .bind(product.weight_value)
            .bind(&product.images)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_product(&self, id: i32, update: &ProductUpdate) -> AppResult<Option<Product>> {
        let query = format!(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 price = COALESCE($3, price), \
                 stock = COALESCE($4, stock), \
                 category_id = COALESCE($5, category_id), \
                 weight_unit = COALESCE($6, weight_unit), \
                 weight_value = COALESCE($7, weight_value), \
                 images = COALESCE($8, images), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.price)
            .bind(update.stock)
            .bind(update.category_id)
            .bind(update.weight_unit.map(|u| u.as_str()))
            .bind(update.weight_value)
            .bind(update.images.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_product(&self, id: i32) -> AppResult<Option<Product>> {
        let query = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
        let row = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query_as::<_, Product>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn product_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn product_by_public_id(&self, public_id: &str) -> AppResult<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE public_id = $1");
        let row = sqlx::query_as::<_, Product>(&query)
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_category(&self, category: &NewCategory) -> AppResult<Category> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&category.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_category(&self, id: i32) -> AppResult<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            "DELETE FROM categories WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// Account store over Postgres
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<i32> {
        let result = sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (first_name, last_name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict("email already in use".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, role, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn profile_by_id(&self, id: i32) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            "SELECT first_name, last_name, email, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count_with_role(&self, role: Role) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
