//! Product and category repository
//!
//! Key layout and invalidation:
//! - point reads: `products:id:<id>`, `products:public:<public_id>`
//! - collections: `products:all`, `products:categories`
//! - product create/update/delete clears `products:*`, since any of the
//!   derived views may now be stale
//! - category create/delete clears only `products:categories`

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cache::{keys, CacheClient};
use crate::error::{AppError, AppResult};
use crate::models::{Category, NewCategory, NewProduct, Product, ProductUpdate};
use crate::repository::{non_empty, read_through};
use crate::store::CatalogStore;

/// Cache-aside access to the catalog
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn CatalogStore>,
    cache: CacheClient,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn CatalogStore>, cache: CacheClient) -> Self {
        Self { store, cache }
    }

    /// Create a product with a fresh public id
    ///
    /// The new row is not cached; the next read repopulates.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> AppResult<Product> {
        let public_id = Uuid::new_v4().to_string();
        let created = self.store.insert_product(&public_id, product).await?;
        self.invalidate_products().await?;
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: i32, update: &ProductUpdate) -> AppResult<Product> {
        let updated = self
            .store
            .update_product(id, update)
            .await?
            .ok_or_else(|| AppError::not_found("product"))?;
        self.invalidate_products().await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> AppResult<Product> {
        let deleted = self
            .store
            .delete_product(id)
            .await?
            .ok_or_else(|| AppError::not_found("product"))?;
        self.invalidate_products().await?;
        Ok(deleted)
    }

    /// All products; an empty catalog is `NotFound`
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> AppResult<Vec<Product>> {
        read_through(&self.cache, &keys::products_all(), "products", || async {
            Ok::<_, AppError>(non_empty(self.store.list_products().await?))
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn by_id(&self, id: i32) -> AppResult<Product> {
        read_through(&self.cache, &keys::product_by_id(id), "product", || {
            self.store.product_by_id(id)
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn by_public_id(&self, public_id: &str) -> AppResult<Product> {
        read_through(
            &self.cache,
            &keys::product_by_public_id(public_id),
            "product",
            || self.store.product_by_public_id(public_id),
        )
        .await
    }

    #[instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create_category(&self, category: &NewCategory) -> AppResult<Category> {
        let created = self.store.insert_category(category).await?;
        self.cache.delete_exact(&keys::product_categories()).await?;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i32) -> AppResult<Category> {
        let deleted = self
            .store
            .delete_category(id)
            .await?
            .ok_or_else(|| AppError::not_found("category"))?;
        self.cache.delete_exact(&keys::product_categories()).await?;
        Ok(deleted)
    }

    /// All categories; none at all is `NotFound`
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        read_through(&self.cache, &keys::product_categories(), "categories", || async {
            Ok::<_, AppError>(non_empty(self.store.list_categories().await?))
        })
        .await
    }

    async fn invalidate_products(&self) -> AppResult<()> {
        let removed = self.cache.delete_by_pattern(&keys::products_pattern()).await?;
        debug!(removed, "Product cache invalidated");
        Ok(())
    }
}
