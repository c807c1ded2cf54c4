//! Domain records
//!
//! Shapes shared by the relational store, the cache and the HTTP layer. A
//! cached entry is the JSON form of exactly these types, so whatever the
//! store returns is what a later cache hit returns.

pub mod product;
pub mod user;

pub use self::product::{Category, NewCategory, NewProduct, Product, ProductUpdate, WeightUnit};
pub use self::user::{
    LoginRequest, RegisterRequest, Role, UnknownVariant, UserCredentials, UserProfile,
};
