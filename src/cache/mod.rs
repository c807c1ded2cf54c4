//! Cache module
//!
//! Provides the cache-aside accelerator in front of the relational store:
//! a pluggable key-value backend (Redis in production, in-memory for tests),
//! a typed client on top of it, and the key naming conventions.

pub mod client;
#[cfg(any(test, feature = "test-utils"))]
pub mod in_memory;
pub mod keys;
pub mod redis;
pub mod store;

pub use self::client::{CacheClient, CacheSettings};
#[cfg(any(test, feature = "test-utils"))]
pub use self::in_memory::InMemoryStore;
pub use self::redis::RedisStore;
pub use self::store::KvStore;
