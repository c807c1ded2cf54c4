//! Catalog records

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UnknownVariant;

/// Unit for a product's net weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    G,
    Kg,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::G => "g",
            WeightUnit::Kg => "kg",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for WeightUnit {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "g" => Ok(WeightUnit::G),
            "kg" => Ok(WeightUnit::Kg),
            _ => Err(UnknownVariant {
                kind: "weight unit",
                value,
            }),
        }
    }
}

/// A product as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub public_id: String,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
    #[sqlx(try_from = "String")]
    pub weight_unit: WeightUnit,
    pub weight_value: f64,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: i32,
    pub weight_unit: WeightUnit,
    pub weight_value: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Partial product update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub category_id: Option<i32>,
    pub weight_unit: Option<WeightUnit>,
    pub weight_value: Option<f64>,
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Apply the present fields onto `product`
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(unit) = self.weight_unit {
            product.weight_unit = unit;
        }
        if let Some(value) = self.weight_value {
            product.weight_value = value;
        }
        if let Some(images) = &self.images {
            product.images = images.clone();
        }
    }
}

/// A product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// Fields required to create a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}
