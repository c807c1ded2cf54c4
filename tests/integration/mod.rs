//! Integration test modules

mod auth;
mod health;
mod products;
