//! In-memory stores for testing
//!
//! Behave like the Postgres stores (ids from 1, RETURNING-style results,
//! unique email) and count reads so tests can tell whether a request was
//! served from cache.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::models::{
    Category, NewCategory, NewProduct, Product, ProductUpdate, Role, UserCredentials, UserProfile,
};
use crate::store::{CatalogStore, UserStore};

#[derive(Default)]
struct CatalogState {
    products: BTreeMap<i32, Product>,
    categories: BTreeMap<i32, Category>,
    next_product_id: i32,
    next_category_id: i32,
}

/// In-memory [`CatalogStore`]
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: Mutex<CatalogState>,
    reads: AtomicUsize,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read queries served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_product(&self, public_id: &str, product: &NewProduct) -> AppResult<Product> {
        let mut state = self.state.lock().await;
        state.next_product_id += 1;
        let now = Utc::now();
        let row = Product {
            id: state.next_product_id,
            public_id: public_id.to_string(),
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            weight_unit: product.weight_unit,
            weight_value: product.weight_value,
            images: product.images.clone(),
            created_at: now,
            updated_at: now,
        };
        state.products.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_product(&self, id: i32, update: &ProductUpdate) -> AppResult<Option<Product>> {
        let mut state = self.state.lock().await;
        Ok(state.products.get_mut(&id).map(|product| {
            update.apply_to(product);
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete_product(&self, id: i32) -> AppResult<Option<Product>> {
        let mut state = self.state.lock().await;
        Ok(state.products.remove(&id))
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        self.count_read();
        let state = self.state.lock().await;
        Ok(state.products.values().cloned().collect())
    }

    async fn product_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        self.count_read();
        let state = self.state.lock().await;
        Ok(state.products.get(&id).cloned())
    }

    async fn product_by_public_id(&self, public_id: &str) -> AppResult<Option<Product>> {
        self.count_read();
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .find(|p| p.public_id == public_id)
            .cloned())
    }

    async fn insert_category(&self, category: &NewCategory) -> AppResult<Category> {
        let mut state = self.state.lock().await;
        state.next_category_id += 1;
        let row = Category {
            id: state.next_category_id,
            name: category.name.clone(),
        };
        state.categories.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_category(&self, id: i32) -> AppResult<Option<Category>> {
        let mut state = self.state.lock().await;
        Ok(state.categories.remove(&id))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.count_read();
        let state = self.state.lock().await;
        Ok(state.categories.values().cloned().collect())
    }
}

struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: chrono::DateTime<Utc>,
}

/// In-memory [`UserStore`]
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserRow>>,
    reads: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of profile reads served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let users = self.users.lock().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<i32> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("email already in use".to_string()));
        }

        let id = users.len() as i32 + 1;
        users.push(UserRow {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).map(|u| UserCredentials {
            id: u.id,
            role: u.role,
            password_hash: u.password_hash.clone(),
        }))
    }

    async fn profile_by_id(&self, id: i32) -> AppResult<Option<UserProfile>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).map(|u| UserProfile {
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            role: u.role,
            created_at: u.created_at,
        }))
    }

    async fn count_with_role(&self, role: Role) -> AppResult<i64> {
        let users = self.users.lock().await;
        Ok(users.iter().filter(|u| u.role == role).count() as i64)
    }
}
