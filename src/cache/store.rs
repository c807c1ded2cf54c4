//! Key-value backend abstraction
//!
//! The cache client only needs a handful of primitive commands. Keeping them
//! behind a trait lets the same cache-aside logic run against Redis in
//! production and an in-memory map in tests.

use async_trait::async_trait;

use crate::error::AppResult;

/// Raw key-value commands used by [`CacheClient`](super::CacheClient)
///
/// Values are opaque strings (JSON produced by the client). Implementations
/// must be safe to share across request tasks.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Backend name for logging and health output
    fn name(&self) -> &'static str;

    /// Cheap liveness check
    async fn ping(&self) -> AppResult<()>;

    /// GET: `None` when the key is absent or expired
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// SET with expiry, overwriting any existing value
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> AppResult<()>;

    /// DEL of a single key; absent keys are not an error
    async fn del(&self, key: &str) -> AppResult<()>;

    /// One SCAN page: returns the next cursor (0 when exhausted) and the
    /// matching keys seen in this page
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> AppResult<(u64, Vec<String>)>;

    /// DEL of many keys in one command
    async fn del_many(&self, keys: &[String]) -> AppResult<()>;
}
