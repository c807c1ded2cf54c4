//! Middleware module
//!
//! Contains the bearer-token and admin-role gates.

pub mod auth;
