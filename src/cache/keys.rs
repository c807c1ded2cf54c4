//! Cache key conventions
//!
//! Keys follow `<entity-plural>:<selector>[:<value>]`. Every key touched by
//! the product repository lives under `products:` so a single pattern
//! delete can clear all derived product views at once.

/// Key written and read back by the startup probe
pub const PROBE_KEY: &str = "storefront:probe";

/// All products list
pub fn products_all() -> String {
    "products:all".to_string()
}

/// Single product by primary key
pub fn product_by_id(id: i32) -> String {
    format!("products:id:{}", id)
}

/// Single product by public identifier
pub fn product_by_public_id(public_id: &str) -> String {
    format!("products:public:{}", public_id)
}

/// All categories list
pub fn product_categories() -> String {
    "products:categories".to_string()
}

/// Pattern covering every product-derived key
pub fn products_pattern() -> String {
    "products:*".to_string()
}

/// Per-subject user profile
pub fn user_profile(user_id: i32) -> String {
    format!("users:id:{}", user_id)
}
